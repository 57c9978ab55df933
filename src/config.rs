//! Run configuration.

use crate::topology::MeshTopology;
use crate::types::{Error, Phase, Result};

/// Capacity used when none is configured, in bytes per message.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Participant that scatters the input and assembles the sorted output.
pub const ROOT: usize = 0;

/// Maximum number of bytes a single message may carry on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity(usize);

impl Capacity {
    /// Create a capacity of `bytes` per message.
    pub fn new(bytes: usize) -> Self {
        Self(bytes)
    }

    /// Number of bytes allowed per message.
    pub fn bytes(&self) -> usize {
        self.0
    }

    /// Fail if a message of `len` bytes does not fit.
    pub fn check(&self, phase: Phase, len: usize) -> Result<()> {
        if len > self.0 {
            Err(Error::CapacityExceeded {
                phase,
                len,
                capacity: self.0,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self(DEFAULT_CAPACITY)
    }
}

/// Validated configuration of a mesh sort run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshConfig {
    topology: MeshTopology,
    capacity: Capacity,
}

impl MeshConfig {
    /// Configure a run over `participants` with the given message capacity.
    pub fn new(participants: usize, capacity: Capacity) -> Result<Self> {
        Ok(Self {
            topology: MeshTopology::from_participants(participants)?,
            capacity,
        })
    }

    /// Mesh addressing for the run.
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// Message capacity for the run.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Chunk length per participant for a total `message_size`, which must be positive.
    pub fn chunk_len(&self, message_size: usize) -> Result<usize> {
        let participants = self.topology.participants();
        match message_size / participants {
            0 => Err(Error::EmptyChunk {
                message_size,
                participants,
            }),
            len => Ok(len),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_capacity_boundary() {
        let capacity = Capacity::new(8);
        assert!(capacity.check(Phase::Gossip, 8).is_ok());
        match capacity.check(Phase::Gossip, 9) {
            Err(Error::CapacityExceeded { len, capacity, .. }) => {
                assert_eq!(len, 9);
                assert_eq!(capacity, 8);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_chunk_len_truncates() {
        let config = MeshConfig::new(4, Capacity::default()).unwrap();
        assert_eq!(config.chunk_len(10).unwrap(), 2);
        assert_eq!(config.chunk_len(4).unwrap(), 1);
        assert!(matches!(
            config.chunk_len(3),
            Err(Error::EmptyChunk { .. })
        ));
    }

    #[test]
    fn test_rejects_non_square_mesh() {
        assert!(MeshConfig::new(6, Capacity::default()).is_err());
    }
}
