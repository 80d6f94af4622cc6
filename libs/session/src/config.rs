//! Client configuration

use std::path::PathBuf;

use common::AuthResult;

/// Configuration for the directory API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Override for the credential file location; platform config dir if unset
    pub credentials_path: Option<PathBuf>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DIRECTORY_API_URL`: Backend base URL (default: "http://localhost:5000")
    /// - `DIRECTORY_CREDENTIALS_PATH`: Credential file override (default: platform config dir)
    /// - `DIRECTORY_HTTP_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> AuthResult<Self> {
        let base_url = std::env::var("DIRECTORY_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());

        let credentials_path = std::env::var("DIRECTORY_CREDENTIALS_PATH")
            .ok()
            .map(PathBuf::from);

        let timeout_secs = std::env::var("DIRECTORY_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(ClientConfig {
            base_url,
            credentials_path,
            timeout_secs,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            credentials_path: None,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_when_env_unset() {
        unsafe {
            std::env::remove_var("DIRECTORY_API_URL");
            std::env::remove_var("DIRECTORY_CREDENTIALS_PATH");
            std::env::remove_var("DIRECTORY_HTTP_TIMEOUT_SECS");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.credentials_path, None);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn reads_overrides_from_env() {
        unsafe {
            std::env::set_var("DIRECTORY_API_URL", "https://directory.example.org");
            std::env::set_var("DIRECTORY_HTTP_TIMEOUT_SECS", "5");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://directory.example.org");
        assert_eq!(config.timeout_secs, 5);

        unsafe {
            std::env::remove_var("DIRECTORY_API_URL");
            std::env::remove_var("DIRECTORY_HTTP_TIMEOUT_SECS");
        }
    }

    #[test]
    #[serial]
    fn falls_back_on_unparseable_timeout() {
        unsafe {
            std::env::set_var("DIRECTORY_HTTP_TIMEOUT_SECS", "not-a-number");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.timeout_secs, 30);

        unsafe {
            std::env::remove_var("DIRECTORY_HTTP_TIMEOUT_SECS");
        }
    }
}
