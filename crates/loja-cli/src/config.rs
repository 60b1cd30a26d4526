//! Storefront configuration file
//!
//! One TOML file with a section per crate. A missing file means defaults;
//! a present but malformed file is an error.

use anyhow::Context;
use loja_admin::AdminConfig;
use loja_cart::CartConfig;
use loja_checkout::CheckoutConfig;
use loja_ui::UiConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "loja.toml";

/// Everything the terminal front end can be configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Directory holding the persisted cart
    pub data_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Cart settings
    pub cart: CartConfig,
    /// Presentation settings
    pub ui: UiConfig,
    /// Checkout settings
    pub checkout: CheckoutConfig,
    /// Admin API settings
    pub admin: AdminConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".loja"),
            log_level: "info".to_string(),
            log_json: false,
            cart: CartConfig::default(),
            ui: UiConfig::default(),
            checkout: CheckoutConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load `path`, or defaults if it does not exist
    ///
    /// # Errors
    /// - the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// - malformed TOML or mistyped values
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Effective configuration as TOML
    ///
    /// # Errors
    /// - a value TOML cannot represent
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}
