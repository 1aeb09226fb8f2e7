use std::path::PathBuf;
use std::str::FromStr;

/// Which storage backend the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Single JSON document on the local filesystem.
    Json,
    /// Relational database through sea-orm.
    Database,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "database" => Ok(Self::Database),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

/// Library service configuration loaded from environment variables.
#[derive(Debug)]
pub struct LibraryConfig {
    /// TCP port for the HTTP server (default 5000). Env var: `LIBRARY_PORT`.
    pub library_port: u16,
    /// `json` (default) or `database`. Env var: `STORAGE_BACKEND`.
    pub storage_backend: StorageBackend,
    /// Document store path (default `.data/data.json`). Env var: `DATA_FILE`.
    pub data_file: PathBuf,
    /// Database connection URL, required when the backend is `database`.
    pub database_url: Option<String>,
    /// HMAC secret for signing session tokens.
    pub session_secret: String,
    /// Fixed administrator credentials.
    pub admin_email: String,
    pub admin_password: String,
    pub admin_secret_key: String,
    /// Cookie domain attribute; host-only cookie when unset.
    pub cookie_domain: Option<String>,
}

impl LibraryConfig {
    pub fn from_env() -> Self {
        let storage_backend = std::env::var("STORAGE_BACKEND")
            .ok()
            .map(|v| v.parse().expect("STORAGE_BACKEND"))
            .unwrap_or(StorageBackend::Json);
        let database_url = std::env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Database {
            assert!(
                database_url.is_some(),
                "DATABASE_URL is required when STORAGE_BACKEND=database"
            );
        }
        Self {
            library_port: std::env::var("LIBRARY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            storage_backend,
            data_file: std::env::var("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".data/data.json")),
            database_url,
            session_secret: std::env::var("SESSION_SECRET").expect("SESSION_SECRET"),
            admin_email: std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL"),
            admin_password: std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD"),
            admin_secret_key: std::env::var("ADMIN_SECRET_KEY").expect("ADMIN_SECRET_KEY"),
            cookie_domain: std::env::var("COOKIE_DOMAIN")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}
