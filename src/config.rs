//! YAML configuration file.
//!
//! Every field is optional; command-line flags take precedence over values
//! from the file. `collection` names a subdirectory of `folder`; a Drive
//! source is addressed by `drive.folder_id` alone.
//!
//! ```yaml
//! collection: feedback
//! folder: ./exports
//! drive:
//!   folder_id: 1iskRT5FQjaFiRWu_qe6AzDQ1mlyYtC6n
//!   auth:
//!     kind: service-account
//!     path: /etc/feedback-lens/service-account.json
//! category_limit: 5
//! sample_rows: 100
//! ```

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::{DEFAULT_CATEGORY_LIMIT, DEFAULT_SAMPLE_ROWS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub folder: Option<PathBuf>,
    #[serde(default)]
    pub drive: Option<DriveConfig>,
    #[serde(default)]
    pub category_limit: Option<usize>,
    #[serde(default)]
    pub sample_rows: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveConfig {
    pub folder_id: String,
    pub auth: AuthConfig,
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// Token read from the named environment variable.
    AccessToken { env: String },
    TokenFile { path: PathBuf },
    ApiKey { env: String },
    /// Google service-account JSON key.
    ServiceAccount { path: PathBuf },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn category_limit(&self) -> usize {
        self.category_limit.unwrap_or(DEFAULT_CATEGORY_LIMIT)
    }

    pub fn sample_rows(&self) -> usize {
        self.sample_rows.unwrap_or(DEFAULT_SAMPLE_ROWS)
    }
}
