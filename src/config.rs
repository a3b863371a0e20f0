use anyhow::Result;
use std::path::PathBuf;

use crate::storage::SqliteStorage;

pub const DB_ENV: &str = "JOBBOARD_DB";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Command-line values win over the environment, which wins over the
    /// platform defaults. A `.env` file in the working directory is read
    /// first when present.
    pub fn load(db_override: Option<PathBuf>, verbose: bool) -> Result<Self> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::resolve(
            db_override,
            verbose,
            std::env::var(DB_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }

    fn resolve(
        db_override: Option<PathBuf>,
        verbose: bool,
        db_env: Option<String>,
        log_env: Option<String>,
    ) -> Result<Self> {
        let db_path = match db_override
            .or_else(|| db_env.filter(|p| !p.trim().is_empty()).map(PathBuf::from))
        {
            Some(path) => path,
            None => SqliteStorage::default_path()?,
        };

        let log_filter = if verbose {
            "jobboard=debug".to_string()
        } else {
            log_env.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
        };

        Ok(Self { db_path, log_filter })
    }
}
