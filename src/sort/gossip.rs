//! Ring exchange inside each column.
use log::debug;

use super::MeshSorter;
use crate::assembly::ColumnAssembly;
use crate::transport::{Tag, Transport};
use crate::types::{Error, Phase, Result};

impl<T: Transport> MeshSorter<'_, T> {
    /// Circulate chunks around the column ring for `k - 1` rounds.
    ///
    /// In every round a participant passes the chunk it received last (its own chunk in the first
    /// round) to the member below, and receives from the member above the chunk that started one
    /// row further up. After the last round the assembly holds the chunk of every column member.
    pub fn gossip(&self, chunk: Vec<u8>) -> Result<ColumnAssembly> {
        let topology = self.topology();
        let id = self.id();
        let below = topology.below(id);
        let above = topology.above(id);
        let chunk_len = chunk.len();
        self.capacity().check(Phase::Gossip, chunk_len)?;

        let mut assembly = ColumnAssembly::new(id, chunk);
        let mut newest = id;
        for round in 0..topology.side() - 1 {
            let payload = assembly
                .get(newest)
                .ok_or_else(|| Error::Protocol(format!("chunk of participant {newest} missing")))?;
            let received =
                self.exchange_checked(below, above, Tag::Exchange, Phase::Gossip, payload)?;
            if received.len() != chunk_len {
                return Err(Error::Protocol(format!(
                    "participant {id} received a chunk of {} elements from {above}, expected {chunk_len}",
                    received.len()
                )));
            }

            let origin = topology.gossip_origin(id, round);
            debug!("gossip round {round}: participant {id} received the chunk of {origin}");
            assembly.insert(origin, received)?;
            newest = origin;
        }
        Ok(assembly)
    }
}
