//! Server configuration from environment variables
//!
//! | Variable             | Default                    |
//! |----------------------|----------------------------|
//! | `PORT`               | `8000`                     |
//! | `MODEL_PATH`         | `model/crop_model.json`    |
//! | `LABEL_ENCODER_PATH` | `model/label_encoder.json` |
//! | `RICE_DATA_PATH`     | `data/RICE_TNAU_STXT.csv`  |
//! | `MONTH_ORDERING`     | `lexicographic`            |

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::varieties::MonthOrdering;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL_PATH: &str = "model/crop_model.json";
const DEFAULT_LABEL_ENCODER_PATH: &str = "model/label_encoder.json";
const DEFAULT_RICE_DATA_PATH: &str = "data/RICE_TNAU_STXT.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub model_path: PathBuf,
    pub label_encoder_path: PathBuf,
    pub rice_data_path: PathBuf,
    pub month_ordering: MonthOrdering,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            label_encoder_path: PathBuf::from(DEFAULT_LABEL_ENCODER_PATH),
            rice_data_path: PathBuf::from(DEFAULT_RICE_DATA_PATH),
            month_ordering: MonthOrdering::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => defaults.port,
        };

        let month_ordering = match lookup("MONTH_ORDERING") {
            Some(raw) => raw.parse().context("Invalid MONTH_ORDERING")?,
            None => defaults.month_ordering,
        };

        Ok(Self {
            port,
            model_path: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.model_path),
            label_encoder_path: lookup("LABEL_ENCODER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.label_encoder_path),
            rice_data_path: lookup("RICE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.rice_data_path),
            month_ordering,
        })
    }
}
