//! Load-balancer exposure settings

use serde::{Deserialize, Serialize};

/// How the master nodes are exposed behind the load balancer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Public-facing listener port
    pub listener_port: u16,

    /// Port each pool member is addressed at (the cluster's client port)
    pub member_port: u16,

    /// Health-monitor policy for the pool
    pub monitor: MonitorPolicy,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            listener_port: 80,
            member_port: 9200,
            monitor: MonitorPolicy::default(),
        }
    }
}

/// Health-monitor probe policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorPolicy {
    /// Seconds between probes
    pub delay_secs: u32,

    /// Seconds before a single probe is considered failed
    pub timeout_secs: u32,

    /// Consecutive successes before a down member is marked up again
    pub max_retries: u32,

    /// Consecutive failures before a member is marked down
    pub max_retries_down: u32,
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            delay_secs: 60,
            timeout_secs: 30,
            max_retries: 3,
            max_retries_down: 3,
        }
    }
}
