use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid page size: {0}")]
    InvalidPageSize(#[from] ParseIntError),
    #[error("Page size must be at least 1")]
    PageSizeOutOfRange,
    #[error("Could not determine home directory")]
    NoHomeDir,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote Telcome API.
    pub api_url: String,
    /// Directory holding the persisted session and the log file.
    pub config_dir: PathBuf,
    /// Rows per page in the dashboard tables.
    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url =
            env::var("TELCOME_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());

        let config_dir = match env::var("TELCOME_CONFIG_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(".telcome"),
        };

        let page_size = env::var("TELCOME_PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()?;
        if page_size == 0 {
            return Err(ConfigError::PageSizeOutOfRange);
        }

        Ok(Config {
            api_url,
            config_dir,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Serialize env access: other tests may set these variables.
        env::remove_var("TELCOME_API_URL");
        env::remove_var("TELCOME_PAGE_SIZE");
        env::set_var("TELCOME_CONFIG_DIR", "/tmp/telcome-test");
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.page_size, 10);
    }
}
