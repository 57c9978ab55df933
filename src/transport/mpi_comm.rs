//! MPI transport, enabled with the `mpi` feature.
//!
//! Messages are sent as `u8` buffers and received with probe-sized receives, so no fixed receive
//! buffer is involved. The caller must keep the `mpi::environment::Universe` alive for as long as
//! the transport is used.

use log::warn;
use mpi::{
    collective::CommunicatorCollectives,
    point_to_point::{Destination, Source},
    request::WaitGuard,
    topology::{Communicator, Rank},
};

use super::{Tag, Transport};
use crate::types::{Error, Result};

/// Transport over an MPI communicator.
pub struct MpiTransport<C: Communicator> {
    comm: C,
}

impl<C: Communicator> MpiTransport<C> {
    /// Wrap a communicator, typically a duplicate of the world communicator.
    pub fn new(comm: C) -> Self {
        Self { comm }
    }

    fn rank_of(&self, participant: usize) -> Result<Rank> {
        if participant >= self.size() {
            return Err(Error::Transport(format!(
                "participant {participant} is outside the communicator"
            )));
        }
        Ok(participant as Rank)
    }
}

impl<C: Communicator> Transport for MpiTransport<C> {
    fn id(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> Result<()> {
        let dest = self.rank_of(dest)?;
        self.comm
            .process_at_rank(dest)
            .send_with_tag(payload, tag.code());
        Ok(())
    }

    fn receive(&self, source: usize, tag: Tag) -> Result<Vec<u8>> {
        let source = self.rank_of(source)?;
        let (message, _status) = self
            .comm
            .process_at_rank(source)
            .receive_vec_with_tag::<u8>(tag.code());
        Ok(message)
    }

    fn exchange(&self, dest: usize, source: usize, tag: Tag, payload: &[u8]) -> Result<Vec<u8>> {
        let dest = self.rank_of(dest)?;
        let source = self.rank_of(source)?;
        let message = mpi::request::scope(|scope| {
            let _send = WaitGuard::from(self.comm.process_at_rank(dest).immediate_send_with_tag(
                scope,
                payload,
                tag.code(),
            ));
            let (message, _status) = self
                .comm
                .process_at_rank(source)
                .receive_vec_with_tag::<u8>(tag.code());
            message
        });
        Ok(message)
    }

    fn barrier(&self) -> Result<()> {
        self.comm.barrier();
        Ok(())
    }

    fn abort(&self) {
        warn!("rank {} aborting the communicator", self.comm.rank());
        self.comm.abort(1)
    }
}
