use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_DOCS_DIR: &str = "content/docs";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of `.md`/`.mdx` documentation pages.
    pub docs_dir: PathBuf,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Optional:
    /// - `DOCS_DIR` (default: "content/docs")
    /// - `LISTEN_ADDR` (default: "127.0.0.1:3000")
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let docs_dir = lookup("DOCS_DIR").unwrap_or_else(|| DEFAULT_DOCS_DIR.to_string());

        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr.parse().map_err(|e| {
            AppError::Config(format!("LISTEN_ADDR '{listen_addr}' is not a socket address: {e}"))
        })?;

        Ok(Self {
            docs_dir: PathBuf::from(docs_dir),
            listen_addr,
        })
    }
}
