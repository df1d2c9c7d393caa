//! # Client Configuration
//!
//! Settings for talking to the pets API, read from an optional YAML file and
//! then overridden by `BATH_TRACKER_*` environment variables.
//!
//! ## YAML Format
//!
//! ```yaml
//! api_base_url: "http://localhost:3000/api"
//! seed_pet_id: "62fbc56a7ac3e2b536ed1153"
//! placeholder_image: "assets/images/unknownPet.jpg"
//! request_timeout_secs: 10
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::models::pet::DEFAULT_PLACEHOLDER_IMAGE;

/// Well-known pet shown when no user-specific pet can be selected
pub const DEFAULT_SEED_PET_ID: &str = "62fbc56a7ac3e2b536ed1153";

pub const ENV_API_URL: &str = "BATH_TRACKER_API_URL";
pub const ENV_SEED_PET_ID: &str = "BATH_TRACKER_SEED_PET_ID";
pub const ENV_PLACEHOLDER_IMAGE: &str = "BATH_TRACKER_PLACEHOLDER_IMAGE";
pub const ENV_TIMEOUT_SECS: &str = "BATH_TRACKER_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API, without the `/pets` prefix
    pub api_base_url: String,
    pub seed_pet_id: String,
    pub placeholder_image: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            seed_pet_id: DEFAULT_SEED_PET_ID.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `path` (if given and present) plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading client config from {}", path.display());
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_yaml_str(&content)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            Some(path) => {
                debug!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(id) = lookup(ENV_SEED_PET_ID) {
            self.seed_pet_id = id;
        }
        if let Some(image) = lookup(ENV_PLACEHOLDER_IMAGE) {
            self.placeholder_image = image;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))?;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        Ok(())
    }
}
