use std::{env, path::PathBuf};

pub const DATABASE_URL_ENV: &str = "NOTES_DATABASE_URL";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

const APP_DIR: &str = "notes_cli";
const DATABASE_FILE: &str = "notes.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub log_filter: String,
}

impl Config {
    /// Reads the process environment after loading `.env`, if there is one.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            database_url: non_blank(DATABASE_URL_ENV).unwrap_or_else(default_database_url),
            log_filter: non_blank(LOG_FILTER_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

pub fn default_database_url() -> String {
    let path = match dirs::data_dir() {
        Some(mut dir) => {
            dir.push(APP_DIR);
            dir.push(DATABASE_FILE);
            dir
        }
        None => PathBuf::from(DATABASE_FILE),
    };
    path.to_string_lossy().into_owned()
}
