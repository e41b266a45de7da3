//! Provisioning error types

use crate::graph::ResourceKind;
use searchfleet_core::{ConfigError, NodeRole};
use thiserror::Error;

/// Error returned by a provider for a single resource call.
///
/// Providers map their own error types into this at the trait boundary;
/// the engine wraps it with the failing resource's kind and position.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ProviderError(String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Provisioning errors
///
/// Every variant is fatal for the run: the first failure stops the
/// build and leaves the graph-so-far for the caller to reconcile.
/// Nothing is retried here.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("invalid cluster settings: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create {kind} for {role} node {index}: {source}")]
    NodeProvision {
        kind: ResourceKind,
        role: NodeRole,
        index: u32,
        source: ProviderError,
    },

    #[error("failed to create {kind}: {source}")]
    Provision {
        kind: ResourceKind,
        source: ProviderError,
    },

    /// An internal precondition was violated. Never expected in correct
    /// operation; points at a defect in topology construction, not at
    /// the environment.
    #[error("topology invariant violated: {0}")]
    TopologyInvariant(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
