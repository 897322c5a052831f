//! Per-symbol signal reliability tracking.
//!
//! Two independent scopes share the same counting rules: [`LocalReliability`]
//! for this installation and [`GlobalReliability`] for the shared pool.
//! Only the local scope can be reset.

pub mod global;
pub mod local;
pub mod table;

pub use global::GlobalReliability;
pub use local::LocalReliability;
pub use table::ReliabilityTable;
