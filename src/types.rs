//! General type definitions

use std::fmt;

/// A communication phase of a mesh sort run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Distribution of the initial chunks from the root.
    Scatter,
    /// Ring exchange inside each column.
    Gossip,
    /// Diagonal to row distribution of the column content.
    Broadcast,
    /// Row-local summation of rank vectors.
    Reduce,
    /// Collection of the aggregated rows on the root.
    Gather,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Scatter => "scatter",
            Phase::Gossip => "gossip",
            Phase::Broadcast => "broadcast",
            Phase::Reduce => "reduce",
            Phase::Gather => "gather",
        };
        f.write_str(name)
    }
}

/// Generic error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The participant count cannot be arranged as a k x k grid.
    #[error("number of participants must be a perfect square, got {participants}")]
    NotPerfectSquare {
        /// Requested participant count.
        participants: usize,
    },
    /// The message size leaves every participant without data.
    #[error("message size {message_size} gives empty chunks for {participants} participants")]
    EmptyChunk {
        /// Requested total number of elements.
        message_size: usize,
        /// Participant count.
        participants: usize,
    },
    /// The dataset cannot be split into equal-length chunks.
    #[error("input size {len} is not divisible by the {participants} participants")]
    UnevenPartition {
        /// Dataset length.
        len: usize,
        /// Participant count.
        participants: usize,
    },
    /// The transport does not span the configured mesh.
    #[error("mesh expects {expected} participants but the transport has {actual}")]
    MeshMismatch {
        /// Participants required by the configuration.
        expected: usize,
        /// Participants provided by the transport.
        actual: usize,
    },
    /// A message does not fit the transfer capacity.
    #[error("{phase} message of {len} bytes exceeds the transfer capacity of {capacity} bytes")]
    CapacityExceeded {
        /// Phase that produced the message.
        phase: Phase,
        /// Encoded size of the message in bytes.
        len: usize,
        /// Configured capacity in bytes.
        capacity: usize,
    },
    /// A participant received something the protocol does not allow.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// The transport failed.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Another participant aborted the run.
    #[error("run aborted by another participant")]
    Aborted,
}

/// Result Type
pub type Result<T> = std::result::Result<T, Error>;
