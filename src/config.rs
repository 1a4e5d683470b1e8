// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "finanzas.toml";
const ENV_PREFIX: &str = "FINANZAS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directive, e.g. `warn` or `finanzas=debug`.
    pub log_level: String,
    /// Overrides the platform data dir holding the database.
    pub data_dir: Option<PathBuf>,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_endpoint: String,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            data_dir: None,
            ai_api_key: None,
            ai_model: "gemini-2.5-flash".to_string(),
            ai_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            http_timeout_secs: 15,
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    crate::db::project_dirs()
        .ok()
        .map(|p| p.config_dir().join(CONFIG_FILE))
}

/// Layers: built-in defaults, then the TOML file (optional), then
/// `FINANZAS_*` environment variables.
pub fn load(explicit: Option<&str>) -> Result<Settings> {
    let mut builder = config::Config::builder();
    match explicit {
        Some(path) => {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        None => {
            if let Some(path) = default_config_path() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let settings: Settings = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;
    Ok(settings)
}
