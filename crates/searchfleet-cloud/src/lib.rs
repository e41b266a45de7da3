//! searchfleet cloud engine
//!
//! Provider abstraction and the cluster provisioning engine: a one-shot
//! forward pass that turns a validated cluster definition into compute,
//! storage, load-balancer and DNS resources, recording every creation
//! in an explicit build graph.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  sfleet CLI                       │
//! │               (plan / up / render)                │
//! └─────────────────┬────────────────────────────────┘
//!                   │
//! ┌─────────────────▼────────────────────────────────┐
//! │              searchfleet-cloud                    │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │
//! │  │ topology │→│ exposure │→│   dns binding    │  │
//! │  └──────────┘ └──────────┘ └──────────────────┘  │
//! │  ┌──────────────────────────────────────────┐    │
//! │  │         trait CloudProvider { ... }       │    │
//! │  └──────────────────────────────────────────┘    │
//! └───────┬──────────────────────┬───────────────────┘
//!         │                      │
//! ┌───────▼────────┐    ┌────────▼───────┐
//! │   openstack    │    │    dry run     │
//! │    provider    │    │   simulator    │
//! └────────────────┘    └────────────────┘
//! ```
//!
//! Master nodes are created strictly sequentially so each payload can
//! embed the confirmed addresses of every predecessor; all other
//! ordering lives in the build graph as advisory edges.

pub mod deploy;
pub mod dns;
pub mod dryrun;
pub mod error;
pub mod exposure;
pub mod graph;
pub mod provider;
pub mod topology;

// Re-exports
pub use deploy::{Deployment, deploy};
pub use dns::{DnsBinding, bind_endpoint};
pub use dryrun::DryRunProvider;
pub use error::{CloudError, ProviderError, ProviderResult, Result};
pub use exposure::{ServiceEndpoint, expose_masters};
pub use graph::{BuildGraph, GraphSummary, ResourceKind, ResourceNode};
pub use provider::{
    AuthStatus, BlockDevice, BlockSource, CloudProvider, Created, CreatedLoadBalancer,
    CreatedServer, DnsRecordSpec, DnsZoneSpec, LbAlgorithm, ListenerSpec, LoadBalancerSpec,
    MonitorSpec, PoolMemberSpec, PoolSpec, PortSpec, Protocol, RecordType, ServerSpec, VolumeSpec,
};
pub use topology::{NodeRecord, Topology, TopologyBuilder};
