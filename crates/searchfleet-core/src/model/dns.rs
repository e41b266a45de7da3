//! DNS binding settings

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Zone and record settings for the cluster endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsSettings {
    /// Zone name, fully qualified with a trailing dot
    pub zone: String,

    /// Zone contact email
    pub email: String,

    /// TTL applied to the zone and the endpoint record
    pub ttl: u32,

    /// Label prepended to the zone name for the endpoint record
    #[serde(default = "default_record_label")]
    pub record_label: String,
}

fn default_record_label() -> String {
    "endpoint".to_string()
}

impl DnsSettings {
    /// Full record name: `<label>.<zone>`.
    pub fn record_name(&self) -> String {
        format!("{}.{}", self.record_label, self.zone)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.zone.is_empty() {
            return Err(ConfigError::missing("dns", "zone"));
        }
        if !self.zone.ends_with('.') {
            return Err(ConfigError::InvalidSettings(format!(
                "dns zone `{}` must be fully qualified with a trailing dot",
                self.zone
            )));
        }
        if self.email.is_empty() {
            return Err(ConfigError::missing("dns", "email"));
        }
        if self.record_label.is_empty() {
            return Err(ConfigError::missing("dns", "record-label"));
        }
        Ok(())
    }
}
