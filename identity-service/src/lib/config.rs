use std::env;
use std::fs;
use std::io;
use std::path::Path;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use rand::distributions::Alphanumeric;
use rand::thread_rng;
use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Symmetric signing secret. Empty means "provision from secret_file".
    #[serde(default)]
    pub secret: String,

    /// Where a generated secret is persisted so restarts reuse it.
    #[serde(default = "JwtConfig::default_secret_file")]
    pub secret_file: String,

    pub expiration_hours: i64,
}

const GENERATED_SECRET_LENGTH: usize = 48;

impl JwtConfig {
    fn default_secret_file() -> String {
        ".jwt_secret".to_string()
    }

    /// Ensure a signing secret is available.
    ///
    /// Precedence: an explicitly configured secret wins; otherwise the
    /// persisted secret file is reused; otherwise a fresh secret is
    /// generated and written to that file. Losing the file invalidates all
    /// outstanding tokens, which is accepted.
    pub fn ensure_secret(&mut self) -> io::Result<()> {
        if !self.secret.is_empty() {
            return Ok(());
        }

        let path = Path::new(&self.secret_file);
        if path.exists() {
            let persisted = fs::read_to_string(path)?.trim().to_string();
            if !persisted.is_empty() {
                self.secret = persisted;
                return Ok(());
            }
        }

        let generated: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_SECRET_LENGTH)
            .map(char::from)
            .collect();
        fs::write(path, &generated)?;
        tracing::info!(path = %path.display(), "Generated new JWT secret");

        self.secret = generated;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// After loading, a JWT secret is provisioned if none was configured.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let mut config: Config = configuration.try_deserialize()?;

        config
            .jwt
            .ensure_secret()
            .map_err(|e| ConfigError::Message(format!("Failed to provision JWT secret: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_secret_path(tag: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("identity_secret_test_{}_{}", tag, std::process::id()))
    }

    fn jwt_config(secret: &str, secret_file: &Path) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            secret_file: secret_file.to_string_lossy().into_owned(),
            expiration_hours: 24,
        }
    }

    #[test]
    fn test_configured_secret_wins() {
        let path = temp_secret_path("configured");
        let mut config = jwt_config("explicit-secret-from-env", &path);

        config.ensure_secret().unwrap();

        assert_eq!(config.secret, "explicit-secret-from-env");
        assert!(!path.exists());
    }

    #[test]
    fn test_generated_secret_is_persisted_and_reused() {
        let path = temp_secret_path("generated");
        let _ = fs::remove_file(&path);

        let mut first = jwt_config("", &path);
        first.ensure_secret().unwrap();
        assert_eq!(first.secret.len(), GENERATED_SECRET_LENGTH);
        assert!(first.secret.chars().all(|c| c.is_ascii_alphanumeric()));

        // A restart reads the same secret back.
        let mut second = jwt_config("", &path);
        second.ensure_secret().unwrap();
        assert_eq!(second.secret, first.secret);

        let _ = fs::remove_file(&path);
    }
}
