//! Configuration management for the album downloader.
//!
//! Settings come from a JSON file. Credentials and the output root may be
//! overridden through environment variables, which are in turn read from a
//! `.env` file in the local data directory when one exists:
//! 1. Environment variables (highest priority)
//! 2. `config.json` (`--config`, the working directory, or the data directory)
//! 3. Application defaults (where applicable)

use std::{env, fmt, io, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "hiresdl";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_OUT_PATH: &str = "HRA downloads";
pub const DEFAULT_TRACK_TEMPLATE: &str = "{{.trackPad}}. {{.title}}";

pub const ENV_EMAIL: &str = "HIRESDL_EMAIL";
pub const ENV_PASSWORD: &str = "HIRESDL_PASSWORD";
pub const ENV_OUT_PATH: &str = "HIRESDL_OUT_PATH";

#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, io::Error),
    SerdeError(serde_json::Error),
    MissingCredentials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(path, e) => write!(f, "{}: {}", path.display(), e),
            ConfigError::SerdeError(e) => write!(f, "{}", e),
            ConfigError::MissingCredentials => write!(f, "Email and password must be set."),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::SerdeError(err)
    }
}

/// Metadata language. The catalog only serves English and German.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_out_path")]
    pub out_path: PathBuf,
    #[serde(default = "default_track_template")]
    pub track_template: String,
    #[serde(default)]
    pub download_booklets: bool,
    #[serde(default)]
    pub max_cover_size: bool,
    #[serde(default)]
    pub keep_cover: bool,
    #[serde(default)]
    pub language: Language,
}

fn default_out_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_PATH)
}

fn default_track_template() -> String {
    DEFAULT_TRACK_TEMPLATE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            out_path: default_out_path(),
            track_template: default_track_template(),
            download_booklets: false,
            max_cover_size: false,
            keep_cover: false,
            language: Language::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(json)?;
        if config.out_path.as_os_str().is_empty() {
            config.out_path = default_out_path();
        }
        if config.track_template.trim().is_empty() {
            config.track_template = default_track_template();
        }
        Ok(config)
    }

    /// Reads and validates the config file, applying environment overrides.
    pub async fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(config_path);
        let json = async_fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::IoError(path.clone(), e))?;
        let mut config = Self::from_json(&json)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(email) = env::var(ENV_EMAIL) {
            self.email = email;
        }
        if let Ok(password) = env::var(ENV_PASSWORD) {
            self.password = password;
        }
        if let Ok(out_path) = env::var(ENV_OUT_PATH) {
            if !out_path.is_empty() {
                self.out_path = PathBuf::from(out_path);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// A missing file is not an error; credentials may just as well live in
/// `config.json`.
///
/// - Linux: `~/.local/share/hiresdl/.env`
/// - macOS: `~/Library/Application Support/hiresdl/.env`
/// - Windows: `%LOCALAPPDATA%/hiresdl/.env`
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// `./config.json` wins over the copy in the data directory.
pub fn config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return local;
    }
    data_dir().join(CONFIG_FILE)
}
