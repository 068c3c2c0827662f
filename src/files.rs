//! Attachment storage. The workflow only ever keeps the reference string a
//! [`FileStore`] hands back.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Error, Result};

const MAX_FILE_NAME_LEN: usize = 100;

pub trait FileStore: Send + Sync {
    /// Persists `bytes` and returns an opaque reference to them.
    fn store(&self, bytes: &[u8], original_name: &str) -> Result<String>;
}

/// Content-addressed files under `<data_dir>/uploads`.
///
/// References look like `ab/cd/<sha256>/<file name>`.
pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("uploads"),
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }

    /// Maps a reference back to a path inside the upload directory.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let relative = Path::new(reference);
        if reference.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidArgument(format!(
                "invalid file reference: {reference}"
            )));
        }
        Ok(self.base_path.join(relative))
    }

    pub fn exists(&self, reference: &str) -> Result<bool> {
        Ok(self.resolve(reference)?.is_file())
    }
}

impl FileStore for LocalFileStore {
    fn store(&self, bytes: &[u8], original_name: &str) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hex::encode(hasher.finalize());

        let reference = format!(
            "{}/{}/{}/{}",
            &digest[0..2],
            &digest[2..4],
            digest,
            sanitize_file_name(original_name)
        );
        let final_path = self.resolve(&reference)?;
        if final_path.is_file() {
            return Ok(reference);
        }

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(bytes)?;
        temp_file.sync_all()?;

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!("Failed to remove {}: {cleanup}", temp_path.display());
                }
            }
            return Err(Error::Io(e));
        }

        Ok(reference)
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_resolve() {
        let temp_dir = TempDir::new().unwrap();
        let files = LocalFileStore::new(temp_dir.path());

        let reference = files.store(b"invoice", "invoice 2024.pdf").unwrap();
        assert!(reference.ends_with("/invoice_2024.pdf"));
        assert!(files.exists(&reference).unwrap());

        let content = fs::read(files.resolve(&reference).unwrap()).unwrap();
        assert_eq!(content, b"invoice");
    }

    #[test]
    fn test_same_content_same_reference() {
        let temp_dir = TempDir::new().unwrap();
        let files = LocalFileStore::new(temp_dir.path());

        let first = files.store(b"abc", "a.txt").unwrap();
        let second = files.store(b"abc", "a.txt").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let files = LocalFileStore::new(temp_dir.path());

        assert!(matches!(
            files.resolve("../etc/passwd"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(files.resolve("/etc/passwd").is_err());
        assert!(files.resolve("").is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../secret.txt"), "secret.txt");
        assert_eq!(sanitize_file_name("..."), "attachment");
        assert_eq!(sanitize_file_name("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(sanitize_file_name(""), "attachment");
    }
}
