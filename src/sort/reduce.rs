//! Row reduction of rank vectors and gather of the aggregated rows on the root.
use log::debug;

use super::{GlobalRankTable, MeshSorter};
use crate::config::ROOT;
use crate::transport::{Tag, Transport};
use crate::types::{Error, Phase, Result};

const RANK_BYTES: usize = std::mem::size_of::<u32>();

/// Little-endian `u32` wire form of a rank vector, four bytes per entry.
///
/// Ranks are bounded by the dataset length, so a dataset longer than `u32::MAX` cannot be sent.
pub fn encode_ranks(ranks: &[usize]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(ranks.len() * RANK_BYTES);
    for &rank in ranks {
        let rank = u32::try_from(rank)
            .map_err(|_| Error::Protocol(format!("rank {rank} does not fit the wire form")))?;
        bytes.extend_from_slice(&rank.to_le_bytes());
    }
    Ok(bytes)
}

/// Inverse of [`encode_ranks`].
pub fn decode_ranks(bytes: &[u8]) -> Result<Vec<usize>> {
    if bytes.len() % RANK_BYTES != 0 {
        return Err(Error::Protocol(format!(
            "rank message of {} bytes is not a whole number of ranks",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(RANK_BYTES)
        .map(|word| {
            let mut raw = [0u8; RANK_BYTES];
            raw.copy_from_slice(word);
            u32::from_le_bytes(raw) as usize
        })
        .collect())
}

impl<T: Transport> MeshSorter<'_, T> {
    /// Sum the rank vectors of a row on its diagonal.
    ///
    /// Returns the aggregated ranks on the diagonal and `None` everywhere else.
    pub fn reduce_row(&self, ranks: Vec<usize>) -> Result<Option<Vec<usize>>> {
        let topology = self.topology();
        let id = self.id();
        let (row, _) = topology.coordinates(id);

        if !topology.is_diagonal(id) {
            self.send_checked(
                topology.diagonal(row),
                Tag::Reduce,
                Phase::Reduce,
                &encode_ranks(&ranks)?,
            )?;
            return Ok(None);
        }

        let mut aggregated = ranks;
        for member in topology.row_members(row).filter(|&member| member != id) {
            let message = self.receive_checked(member, Tag::Reduce, Phase::Reduce)?;
            let received = decode_ranks(&message)?;
            if received.len() != aggregated.len() {
                return Err(Error::Protocol(format!(
                    "participant {member} sent {} ranks, row {row} has {}",
                    received.len(),
                    aggregated.len()
                )));
            }
            for (total, rank) in aggregated.iter_mut().zip(received) {
                *total += rank;
            }
        }
        debug!("row {row} reduced on participant {id}");
        Ok(Some(aggregated))
    }

    /// Collect every row's data and aggregated ranks on the root, in row order.
    ///
    /// Called on diagonals only. Returns the table on the root and `None` on the other diagonals.
    pub fn gather(
        &self,
        row_data: Vec<u8>,
        aggregated: Vec<usize>,
    ) -> Result<Option<GlobalRankTable>> {
        let topology = self.topology();

        if !self.is_root() {
            let ranks = encode_ranks(&aggregated)?;
            self.send_checked(ROOT, Tag::Gather, Phase::Gather, &ranks)?;
            self.send_checked(ROOT, Tag::Gather, Phase::Gather, &row_data)?;
            return Ok(None);
        }

        let mut table = GlobalRankTable::default();
        table.push_row(&row_data, aggregated)?;
        for row in 1..topology.side() {
            let diagonal = topology.diagonal(row);
            let message = self.receive_checked(diagonal, Tag::Gather, Phase::Gather)?;
            let ranks = decode_ranks(&message)?;
            let data = self.receive_checked(diagonal, Tag::Gather, Phase::Gather)?;
            table.push_row(&data, ranks)?;
        }
        debug!("root gathered {} rows", topology.side());
        Ok(Some(table))
    }
}
