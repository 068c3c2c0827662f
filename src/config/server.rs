use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Optional settings file looked up inside the data directory.
pub const CONFIG_FILE_NAME: &str = "formflow.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://forms.example.com").
    /// Used to derive form URLs when a form is created without one.
    pub public_base_url: Option<String>,
    /// Organization time zone as minutes east of UTC. All recorded timestamps
    /// use this offset.
    pub utc_offset_minutes: i32,
    /// Largest accepted request body, attachments included.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("formflow.db")
    }

    /// Loads `formflow.toml` from `data_dir` if present, otherwise defaults.
    /// The data directory itself always wins over a value in the file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<Self>(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(Error::Io(e)),
        };
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            public_base_url: None,
            utc_offset_minutes: 0,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ServerConfig::load(temp.path()).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, temp.path());
        assert_eq!(config.db_path(), temp.path().join("formflow.db"));
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "port = 9090\nutc_offset_minutes = 330\npublic_base_url = \"https://forms.example.com\"\n",
        )
        .unwrap();

        let config = ServerConfig::load(temp.path()).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.utc_offset_minutes, 330);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://forms.example.com")
        );
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "port = \"eighty\"").unwrap();

        assert!(matches!(
            ServerConfig::load(temp.path()),
            Err(Error::Config(_))
        ));
    }
}
