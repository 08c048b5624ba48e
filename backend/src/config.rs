use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_DATA_FOLDER: &str = "Babylog";

/// Application configuration loaded from environment variables,
/// with a `.env` file read first when present.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the per-profile data directories
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup("BABYLOG_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME")
                    .or_else(|| lookup("USERPROFILE"))
                    .ok_or_else(|| anyhow!("Could not determine home directory; set BABYLOG_DATA_DIR"))?;
                PathBuf::from(home).join("Documents").join(DEFAULT_DATA_FOLDER)
            }
        };

        let bind_addr = lookup("BABYLOG_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BABYLOG_BIND_ADDR must be a socket address such as 127.0.0.1:3000")?;

        Ok(AppConfig {
            data_dir,
            bind_addr,
            cors_origin: lookup("BABYLOG_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
