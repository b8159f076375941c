//! Common types and errors for the whisker toolkit

pub mod error;

pub use error::{Error, Result};

/// Identifier of a maze cell (`row * width + col`).
pub type NodeId = u32;

/// Traversal cost of an edge, and of any path made of edges.
pub type Weight = u64;
