//! Settings and rendering error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no `cluster` block found in settings file")]
    MissingCluster,

    #[error("`{section}` is missing required field `{field}`")]
    MissingField { section: String, field: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("cluster must have at least one master node")]
    NoMasterNodes,

    #[error("payload template error: {0}")]
    TemplateRender(String),

    #[error(
        "settings file not found\nsearched: {0}\nhint: run inside a directory containing fleet.kdl, or set FLEET_CONFIG_PATH"
    )]
    SettingsFileNotFound(PathBuf),
}

impl ConfigError {
    pub(crate) fn missing(section: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            section: section.into(),
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
