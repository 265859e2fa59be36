// src/dag/mod.rs

//! Dependency graph construction and resolution.
//!
//! - [`node`] defines the `<component>.<task>` node identifiers.
//! - [`graph`] builds the reverse-dependency graph from `depends.<task>`
//!   declarations.
//! - [`state`] is the pure resolution state machine (counts, ready queue,
//!   completion and failure cascades, cycle validation).
//! - [`resolver`] wraps the state in a mutex/condvar monitor and streams
//!   ready batches to the executor.

pub mod graph;
pub mod node;
pub mod resolver;
pub mod state;

pub use graph::{DepSet, ReverseDepGraph, build_reverse_deps};
pub use node::{ComponentTask, NodeId, node_id};
pub use resolver::{GraphResolver, Resolver, resolve_deep, resolve_reverse};
pub use state::ResolutionState;
