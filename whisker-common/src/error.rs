//! Error types for the whisker toolkit
//!
//! Library crates return [`Error`]; binaries wrap it in `anyhow` at the boundary.

use crate::NodeId;
use thiserror::Error;

/// Main error type for whisker operations
#[derive(Debug, Error)]
pub enum Error {
    /// Node id outside the graph
    #[error("Node {0} does not exist in the maze")]
    UnknownNode(NodeId),

    /// A point of interest cannot be reached from another one
    #[error("Node {to} is unreachable from node {from}")]
    Unreachable { from: NodeId, to: NodeId },

    /// Malformed input (maze description, path, start index, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Route expansion disagrees with the metagraph about reachability.
    ///
    /// Both stages ran on the same inputs, so this is a bug, never a
    /// recoverable condition.
    #[error("Internal inconsistency: no stored route from {from} to {to}")]
    InconsistentRouting { from: NodeId, to: NodeId },

    /// A move was requested after the planned moves ran out
    #[error("Action queue exhausted at turn {turn}: route planning under-produced moves")]
    ActionQueueExhausted { turn: usize },

    /// A move was requested before preprocessing
    #[error("Agent has no plan: preprocessing was not run")]
    NotPrepared,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors that indicate a bug in the planner rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InconsistentRouting { .. } | Error::ActionQueueExhausted { .. }
        )
    }
}

/// Convenience result type for whisker operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::InconsistentRouting { from: 0, to: 1 }.is_fatal());
        assert!(Error::ActionQueueExhausted { turn: 4 }.is_fatal());
        assert!(!Error::Unreachable { from: 0, to: 1 }.is_fatal());
        assert!(!Error::NotPrepared.is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "maze.json");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("maze.json"));
    }
}
