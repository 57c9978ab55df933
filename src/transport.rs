//! Point-to-point message passing between mesh participants.
//!
//! The sort only needs tagged blocking sends and receives, one overlapped send/receive pair for
//! the ring rounds, a barrier and a way to bring the whole run down. Messages are byte buffers of
//! any length; capacity limits are enforced by the phases, not by the transport.
pub mod local;
#[cfg(feature = "mpi")]
pub mod mpi_comm;

pub use local::{LocalMesh, LocalTransport};
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiTransport;

use crate::types::Result;

/// Channel a message travels on.
///
/// Every logical phase has its own tag so that two transfers between the same pair of
/// participants in different phases can never be matched against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Column gossip and diagonal broadcast.
    Exchange,
    /// Row reduction of rank vectors.
    Reduce,
    /// Gather of aggregated rows on the root.
    Gather,
    /// Initial distribution of chunks.
    Scatter,
}

impl Tag {
    /// Numeric tag used on the wire.
    pub fn code(&self) -> i32 {
        match self {
            Tag::Exchange => 0,
            Tag::Reduce => 1,
            Tag::Gather => 2,
            Tag::Scatter => 3,
        }
    }
}

/// Message passing between the participants of one run.
pub trait Transport {
    /// Identifier of this participant.
    fn id(&self) -> usize;

    /// Number of participants.
    fn size(&self) -> usize;

    /// Blocking send of `payload` to `dest`.
    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> Result<()>;

    /// Blocking receive of the next message from `source` on `tag`.
    fn receive(&self, source: usize, tag: Tag) -> Result<Vec<u8>>;

    /// Send `payload` to `dest` while receiving from `source`, and wait for both.
    ///
    /// The send must not block the receive, otherwise a ring of exchanges deadlocks.
    fn exchange(&self, dest: usize, source: usize, tag: Tag, payload: &[u8]) -> Result<Vec<u8>>;

    /// Wait until every participant has reached the barrier.
    fn barrier(&self) -> Result<()>;

    /// Bring down the whole run after a fatal error on this participant.
    fn abort(&self);
}
