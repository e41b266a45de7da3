//! Settings model
//!
//! Typed representation of a `fleet.kdl` cluster definition. The parser
//! fills these structs; everything downstream treats them as read-only.

mod cluster;
mod dns;
mod exposure;

// Re-exports
pub use cluster::*;
pub use dns::*;
pub use exposure::*;
