//! searchfleet core
//!
//! Settings model and per-node bootstrap generation for searchfleet.
//! This crate is pure: it parses a `fleet.kdl` cluster definition into a
//! validated [`ClusterConfig`] and turns role + seed addresses into the
//! typed directive set a node boots from. Resource creation lives in
//! `searchfleet-cloud`.

pub mod bootstrap;
pub mod error;
pub mod model;
pub mod parser;

// Re-exports
pub use bootstrap::{NodeConfig, SeedHost, StorageDirectives};
pub use error::{ConfigError, Result};
pub use model::{
    ClusterConfig, DnsSettings, ExposureConfig, MonitorPolicy, NodeGroupConfig, NodeRole,
};
pub use parser::parse_settings;
