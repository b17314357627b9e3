use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for a local daemon.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL.
    pub database_url: String,
    /// Folders to seed into settings when none are configured yet,
    /// parsed from comma-separated `WATCH_DIRS`.
    pub watch_dirs: Vec<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `127.0.0.1`                      |
    /// | `PORT`                 | `3000`                           |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `DATABASE_URL`         | `sqlite://snapsweep.db`          |
    /// | `WATCH_DIRS`           | `$HOME/Pictures/Screenshots`     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://snapsweep.db".into());

        let watch_dirs: Vec<PathBuf> = match std::env::var("WATCH_DIRS") {
            Ok(dirs) => dirs
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(_) => default_watch_dirs(),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            watch_dirs,
        }
    }
}

/// The platform screenshots folder, when a home directory is known.
fn default_watch_dirs() -> Vec<PathBuf> {
    match std::env::var("HOME") {
        Ok(home) => vec![PathBuf::from(home).join("Pictures").join("Screenshots")],
        Err(_) => Vec::new(),
    }
}
