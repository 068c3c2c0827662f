use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use formflow::clock::OrgClock;
use formflow::config::ServerConfig;
use formflow::files::LocalFileStore;
use formflow::notify::{QueueNotifier, TracingNotifier, deliver_outbox};
use formflow::server::{AppState, create_router};
use formflow::store::{SqliteStore, Store};
use formflow::types::{NewUser, Role, UserStatus};
use formflow::workflow::FormService;

/// Placeholder stored for seeded users. Credentials are managed by the
/// identity provider in front of this server.
const EXTERNAL_PASSWORD_HASH: &str = "!external";

#[derive(Parser)]
#[command(name = "formflow")]
#[command(about = "Form assignment and approval server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Data directory for the database, uploads and formflow.toml
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Host to bind to (overrides formflow.toml)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides formflow.toml)
        #[arg(long, short)]
        port: Option<u16>,

        /// Public base URL for external access (e.g., "https://forms.example.com").
        /// Used to derive form URLs.
        #[arg(long)]
        public_base_url: Option<String>,

        /// Organization time zone as minutes east of UTC
        #[arg(long, allow_hyphen_values = true)]
        utc_offset_minutes: Option<i32>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and first admin user)
    Init {
        /// Data directory for database and uploads
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Display name of the first admin
        #[arg(long)]
        name: String,

        /// Email of the first admin
        #[arg(long)]
        email: String,
    },

    /// Add a user
    AddUser {
        #[arg(long, default_value = "./data")]
        data_dir: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Give the user the admin role
        #[arg(long)]
        admin: bool,
    },

    /// Activate or deactivate a user
    SetUserStatus {
        #[arg(long, default_value = "./data")]
        data_dir: String,

        #[arg(long)]
        id: i64,

        /// "active" or "inactive"
        #[arg(long)]
        status: String,
    },

    /// List users
    Users {
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let db_path = ServerConfig::load(data_dir)?.db_path();
    if !db_path.exists() {
        bail!("Server not initialized. Run 'formflow admin init' first to create the database.");
    }
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;
    Ok(store)
}

fn run_init(data_dir: String, name: String, email: String) -> anyhow::Result<()> {
    let data_path = PathBuf::from(data_dir);
    fs::create_dir_all(&data_path)?;

    let store = SqliteStore::new(ServerConfig::load(&data_path)?.db_path())?;
    store.initialize()?;

    if store.has_admin_user()? {
        bail!(
            "Server already initialized. An admin user exists in {}",
            data_path.display()
        );
    }

    let admin = store.create_user(&NewUser {
        name,
        email,
        password_hash: EXTERNAL_PASSWORD_HASH.to_string(),
        role: Role::Admin,
    })?;

    println!();
    println!("========================================");
    println!("Created admin '{}' with id {}", admin.name, admin.id);
    println!("Send requests with header 'X-User-Id: {}'", admin.id);
    println!("========================================");
    println!();

    Ok(())
}

fn run_add_user(data_dir: String, name: String, email: String, admin: bool) -> anyhow::Result<()> {
    let store = open_store(Path::new(&data_dir))?;

    let user = store.create_user(&NewUser {
        name,
        email,
        password_hash: EXTERNAL_PASSWORD_HASH.to_string(),
        role: if admin { Role::Admin } else { Role::NormalUser },
    })?;

    println!("Created {} '{}' with id {}", user.role, user.name, user.id);
    Ok(())
}

fn run_set_user_status(data_dir: String, id: i64, status: String) -> anyhow::Result<()> {
    let status: UserStatus = status.parse()?;
    let store = open_store(Path::new(&data_dir))?;

    if !store.set_user_status(id, status)? {
        bail!("User {id} not found");
    }

    println!("User {id} is now {status}");
    Ok(())
}

fn run_list_users(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = open_store(Path::new(&data_dir))?;
    let users = store.list_users()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    for user in users {
        println!(
            "{:>5}  {:<12} {:<8} {} <{}>",
            user.id, user.role, user.status, user.name, user.email
        );
    }
    Ok(())
}

async fn run_serve(
    data_dir: String,
    host: Option<String>,
    port: Option<u16>,
    public_base_url: Option<String>,
    utc_offset_minutes: Option<i32>,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(Path::new(&data_dir))?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if public_base_url.is_some() {
        config.public_base_url = public_base_url;
    }
    if let Some(minutes) = utc_offset_minutes {
        config.utc_offset_minutes = minutes;
    }

    let store = open_store(&config.data_dir)?;
    if !store.has_admin_user()? {
        bail!("Server not initialized. Run 'formflow admin init' first to create an admin user.");
    }

    let clock = OrgClock::from_offset_minutes(config.utc_offset_minutes)?;
    let uploads = Arc::new(LocalFileStore::new(&config.data_dir));

    let (notifier, outbox) = QueueNotifier::new();
    tokio::spawn(deliver_outbox(outbox, TracingNotifier));

    let service = FormService::new(
        Arc::new(store),
        Arc::new(notifier),
        uploads.clone(),
        Arc::new(clock),
    )
    .with_public_base_url(config.public_base_url.clone());

    let state = Arc::new(AppState {
        service: Arc::new(service),
        uploads,
        max_upload_bytes: config.max_upload_bytes,
    });

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {} (utc offset {})", addr, clock.offset());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("formflow=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                name,
                email,
            } => run_init(data_dir, name, email)?,
            AdminCommands::AddUser {
                data_dir,
                name,
                email,
                admin,
            } => run_add_user(data_dir, name, email, admin)?,
            AdminCommands::SetUserStatus {
                data_dir,
                id,
                status,
            } => run_set_user_status(data_dir, id, status)?,
            AdminCommands::Users { data_dir, json } => run_list_users(data_dir, json)?,
        },
        Commands::Serve {
            data_dir,
            host,
            port,
            public_base_url,
            utc_offset_minutes,
        } => run_serve(data_dir, host, port, public_base_url, utc_offset_minutes).await?,
    }

    Ok(())
}
