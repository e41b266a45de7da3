//! Build-graph record for created resources
//!
//! Every resource the engine creates is appended here together with the
//! identifiers of the resources that had to exist first. The edges are
//! advisory: the engine has already awaited each creation, and an
//! external execution engine replaying the graph may parallelize any
//! branches that share no edge.

use serde::{Deserialize, Serialize};

/// Kind of a created resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Volume,
    Port,
    Server,
    LoadBalancer,
    Listener,
    Pool,
    PoolMember,
    HealthMonitor,
    DnsZone,
    DnsRecord,
}

/// Fixed display order for summaries.
const KIND_ORDER: [ResourceKind; 10] = [
    ResourceKind::Volume,
    ResourceKind::Port,
    ResourceKind::Server,
    ResourceKind::LoadBalancer,
    ResourceKind::Listener,
    ResourceKind::Pool,
    ResourceKind::PoolMember,
    ResourceKind::HealthMonitor,
    ResourceKind::DnsZone,
    ResourceKind::DnsRecord,
];

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::Port => write!(f, "port"),
            ResourceKind::Server => write!(f, "server"),
            ResourceKind::LoadBalancer => write!(f, "load balancer"),
            ResourceKind::Listener => write!(f, "listener"),
            ResourceKind::Pool => write!(f, "pool"),
            ResourceKind::PoolMember => write!(f, "pool member"),
            ResourceKind::HealthMonitor => write!(f, "health monitor"),
            ResourceKind::DnsZone => write!(f, "dns zone"),
            ResourceKind::DnsRecord => write!(f, "dns record"),
        }
    }
}

/// One created resource and its predecessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Provider-assigned identifier
    pub id: String,

    pub kind: ResourceKind,

    /// Logical name the resource was created under
    pub name: String,

    /// Identifiers of resources that must exist before this one
    pub deps: Vec<String>,
}

impl ResourceNode {
    pub fn new(id: impl Into<String>, kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            deps: Vec::new(),
        }
    }

    pub fn with_deps(mut self, deps: Vec<String>) -> Self {
        self.deps = deps;
        self
    }
}

/// Append-only record of the constructed resource DAG.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildGraph {
    nodes: Vec<ResourceNode>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: ResourceNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every dependency refers to a node appended earlier, so the record
    /// is a topological order of itself. Holds by construction; exposed
    /// for callers that replay the graph.
    pub fn is_creation_ordered(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if !node.deps.iter().all(|d| seen.contains(d.as_str())) {
                return false;
            }
            seen.insert(node.id.as_str());
        }
        true
    }

    pub fn summary(&self) -> GraphSummary {
        let mut counts = Vec::new();
        for kind in KIND_ORDER {
            let count = self.nodes.iter().filter(|n| n.kind == kind).count();
            if count > 0 {
                counts.push((kind, count));
            }
        }
        GraphSummary {
            counts,
            total: self.nodes.len(),
        }
    }
}

/// Per-kind resource counts for display.
#[derive(Debug, Clone)]
pub struct GraphSummary {
    pub counts: Vec<(ResourceKind, usize)>,
    pub total: usize,
}

impl std::fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} resources to create", self.total)?;
        for (i, (kind, count)) in self.counts.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{count} {kind}{}", if *count == 1 { "" } else { "s" })?;
        }
        Ok(())
    }
}
