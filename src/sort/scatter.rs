//! Distribution of equal-length chunks from the root.
use log::debug;

use super::MeshSorter;
use crate::config::ROOT;
use crate::transport::{Tag, Transport};
use crate::types::{Error, Phase, Result};

impl<T: Transport> MeshSorter<'_, T> {
    /// Split `dataset` on the root into one chunk per participant and return this participant's
    /// chunk. Only the root passes a dataset; it keeps the first chunk.
    pub fn scatter(&self, dataset: Option<&[u8]>) -> Result<Vec<u8>> {
        let participants = self.topology().participants();
        if !self.is_root() {
            return self.receive_checked(ROOT, Tag::Scatter, Phase::Scatter);
        }

        let dataset = dataset
            .ok_or_else(|| Error::Protocol("root participant has no dataset".to_string()))?;
        if dataset.is_empty() {
            return Err(Error::EmptyChunk {
                message_size: 0,
                participants,
            });
        }
        if dataset.len() % participants != 0 {
            return Err(Error::UnevenPartition {
                len: dataset.len(),
                participants,
            });
        }
        let chunk_len = dataset.len() / participants;
        self.capacity().check(Phase::Scatter, chunk_len)?;
        for (dest, chunk) in dataset.chunks(chunk_len).enumerate() {
            if dest != ROOT {
                self.send_checked(dest, Tag::Scatter, Phase::Scatter, chunk)?;
            }
        }
        debug!("root scattered {participants} chunks of {chunk_len} elements");
        Ok(dataset[ROOT * chunk_len..(ROOT + 1) * chunk_len].to_vec())
    }
}
