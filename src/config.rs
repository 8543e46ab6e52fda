use crate::helper::post_helpers::ConcurrencyMode;
use crate::models::db_operations::posts_db_operations::IdPolicy;
use crate::models::db_operations::storage_operations::WriteStrategy;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    pub posts_file_path: String,
    pub static_path: String,
    pub templates_glob: String,
    pub allowed_origins: String,
    pub log_level: String,
    // Validated from the environment and filled in after deserialization.
    #[serde(skip)]
    pub id_policy: IdPolicy,
    #[serde(skip)]
    pub concurrency_mode: ConcurrencyMode,
    #[serde(skip)]
    pub write_strategy: WriteStrategy,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, config::ConfigError> {
    lookup(key).ok_or_else(|| config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", key
    )))
}

fn parsed_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<T, config::ConfigError>
where
    T: FromStr<Err = String> + Default,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse::<T>()
            .map_err(|e| config::ConfigError::Message(format!("FATAL: Invalid '{}': {}", key, e))),
        _ => Ok(T::default()),
    }
}

impl Config {
    /// Loads the given .env file into the process environment, then builds the config from it.
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, config::ConfigError> {
        // --- VALIDATION & EXTRACTION LOGIC ---
        let posts_file_path = required(&lookup, "POSTS_FILE_PATH")?;
        if Path::new(&posts_file_path).is_relative() {
            return Err(config::ConfigError::Message(format!(
                "FATAL: The 'POSTS_FILE_PATH' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
                posts_file_path
            )));
        }

        let static_path = lookup("STATIC_PATH").unwrap_or_else(|| "./static".to_string());
        let templates_glob = lookup("TEMPLATES_GLOB").unwrap_or_else(|| "templates/**/*.html".to_string());
        let allowed_origins = lookup("ALLOWED_ORIGINS").unwrap_or_default();
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let id_policy: IdPolicy = parsed_or_default(&lookup, "ID_POLICY")?;
        let concurrency_mode: ConcurrencyMode = parsed_or_default(&lookup, "CONCURRENCY_MODE")?;
        let write_strategy: WriteStrategy = parsed_or_default(&lookup, "WRITE_STRATEGY")?;
        // --- END VALIDATION & EXTRACTION ---

        let builder = config::Config::builder()
            .set_default("web.host", "127.0.0.1")?
            .set_default("web.port", 5000_i64)?
            // Optional TOML file for web host/port.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml).required(false))
            .set_override("posts_file_path", posts_file_path)?
            .set_override("static_path", static_path)?
            .set_override("templates_glob", templates_glob)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .build()?;

        let mut config: Config = builder.try_deserialize()?;
        config.id_policy = id_policy;
        config.concurrency_mode = concurrency_mode;
        config.write_strategy = write_strategy;
        Ok(config)
    }

    /// Returns the full path to the posts document.
    pub fn posts_file(&self) -> PathBuf {
        PathBuf::from(&self.posts_file_path)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}
