//! Application Configuration
//!
//! User settings stored in TOML format. The cloud API credential is
//! deployment configuration: it comes from the config file or an
//! environment variable, never from source code.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::camera::FacingMode;
use crate::recognize::EngineSelector;

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "CARDSCAN_VISION_API_KEY";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera settings
    pub camera: CameraSettings,
    /// Recognition settings
    pub recognition: RecognitionSettings,
    /// Cloud endpoint settings
    pub cloud: CloudSettings,
}

/// Camera-related settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Facing mode requested on startup
    pub initial_facing: FacingMode,
}

/// Recognition-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionSettings {
    /// Default engine when none is selected explicitly
    pub engine: EngineSelector,
    /// Language hint passed to the local engine (e.g. "jpn", "jpn+eng")
    pub language: String,
    /// Binarize the frame before local recognition
    pub preprocess: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            engine: EngineSelector::default(),
            language: "jpn+eng".to_string(),
            preprocess: false,
        }
    }
}

/// Cloud text-detection endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSettings {
    /// Annotate endpoint base URL
    pub endpoint: String,
    /// API key; the environment variable takes precedence when set
    pub api_key: Option<String>,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: None,
        }
    }
}

impl CloudSettings {
    /// Full request URL, with the credential as a query parameter when one
    /// is configured
    pub fn annotate_url(&self) -> String {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone());
        match key {
            Some(key) if !key.is_empty() => format!("{}?key={}", self.endpoint, key),
            _ => self.endpoint.clone(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default config file location
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "cardscan", "CardScan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("config.toml"))
}
