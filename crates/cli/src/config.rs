//! CLI configuration

use anyhow::{Context, Result};
use cinebook_http::{BookingClient, Routes, TokenStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix; nested keys use `__`, e.g. `CINEBOOK__API__BASE_URL`
const ENV_PREFIX: &str = "CINEBOOK";

/// File name of the token store inside the data directory
const TOKEN_FILE: &str = "tokens.json";

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub routes: Routes,
}

/// Booking service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base address of the booking service
    pub base_url: String,

    /// Request timeout in seconds (0 disables it)
    pub timeout_secs: u64,

    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8010".to_string(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl CliConfig {
    /// Load configuration: defaults, then the config file, then environment
    ///
    /// `path` must exist when given; otherwise `<data_dir>/config.toml` is
    /// read if present.
    pub fn load(path: Option<&Path>, data_dir: &Path) -> Result<Self> {
        Self::load_with_env(path, data_dir, None)
    }

    /// `env` replaces the process environment when given
    fn load_with_env(
        path: Option<&Path>,
        data_dir: &Path,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(data_dir.join(CONFIG_FILE)).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .source(env),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Build a client whose tokens persist in the data directory
    pub fn build_client(&self, data_dir: &Path) -> Result<BookingClient> {
        let mut builder = BookingClient::builder()
            .base_url(&self.api.base_url)
            .routes(self.routes.clone())
            .token_store(TokenStore::open(token_path(data_dir)));

        if self.api.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.api.timeout_secs));
        }
        if let Some(user_agent) = &self.api.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(builder.build()?)
    }
}

pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILE)
}

/// Save configuration to a TOML file
pub fn save_config<P: AsRef<Path>>(config: &CliConfig, path: P) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    save_config(&CliConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(None, dir.path()).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8010");
        assert_eq!(config.routes, Routes::default());
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(CliConfig::load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[api]\nbase_url = \"https://tickets.example.com\"\n\n[routes]\nsignup = \"/accounts/signup/\"\n",
        )
        .unwrap();

        let config = CliConfig::load(None, dir.path()).unwrap();

        assert_eq!(config.api.base_url, "https://tickets.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.routes.signup, "/accounts/signup/");
        assert_eq!(config.routes.login, "/login");
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[api]\nbase_url = \"https://tickets.example.com\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        let env = [
            ("CINEBOOK__API__BASE_URL", "http://staging:9000"),
            ("CINEBOOK__ROUTES__SIGNUP", "/accounts/signup/"),
            ("UNRELATED__API__BASE_URL", "http://ignored"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config = CliConfig::load_with_env(None, dir.path(), Some(env)).unwrap();

        assert_eq!(config.api.base_url, "http://staging:9000");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.routes.signup, "/accounts/signup/");
    }

    #[test]
    fn test_generated_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated.toml");

        generate_default_config(&path).unwrap();
        let config = CliConfig::load(Some(&path), dir.path()).unwrap();

        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.routes.refresh, "/token/refresh");
    }

    #[test]
    fn test_client_uses_data_dir_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let client = CliConfig::default().build_client(dir.path()).unwrap();

        client
            .tokens()
            .write(&cinebook_http::TokenPair::new("A1", "R1"))
            .unwrap();
        assert!(token_path(dir.path()).exists());
    }
}
