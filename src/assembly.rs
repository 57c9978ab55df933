//! Per-column accumulation of chunks keyed by origin participant.
use std::collections::BTreeMap;

use crate::types::{Error, Result};

/// Chunks of one column, keyed by the participant that originally owned them.
///
/// Iteration and concatenation follow ascending origin, which is row order within a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAssembly {
    chunks: BTreeMap<usize, Vec<u8>>,
}

impl ColumnAssembly {
    /// Assembly holding only the participant's own chunk.
    pub fn new(origin: usize, chunk: Vec<u8>) -> Self {
        let mut chunks = BTreeMap::new();
        chunks.insert(origin, chunk);
        Self { chunks }
    }

    /// Add the chunk of `origin`. Entries are never replaced.
    pub fn insert(&mut self, origin: usize, chunk: Vec<u8>) -> Result<()> {
        if self.chunks.contains_key(&origin) {
            return Err(Error::Protocol(format!(
                "chunk of participant {origin} received twice"
            )));
        }
        self.chunks.insert(origin, chunk);
        Ok(())
    }

    /// Chunk of `origin`, if present.
    pub fn get(&self, origin: usize) -> Option<&[u8]> {
        self.chunks.get(&origin).map(Vec::as_slice)
    }

    /// Origins held, ascending.
    pub fn origins(&self) -> impl Iterator<Item = usize> + '_ {
        self.chunks.keys().copied()
    }

    /// Number of chunks held.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is held.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All chunks joined in ascending origin order.
    pub fn concatenate(&self) -> Vec<u8> {
        let total = self.chunks.values().map(Vec::len).sum();
        let mut content = Vec::with_capacity(total);
        for chunk in self.chunks.values() {
            content.extend_from_slice(chunk);
        }
        content
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_concatenates_in_origin_order() {
        let mut assembly = ColumnAssembly::new(5, b"mid".to_vec());
        assembly.insert(8, b"end".to_vec()).unwrap();
        assembly.insert(2, b"top".to_vec()).unwrap();
        assert_eq!(assembly.concatenate(), b"topmidend".to_vec());
        assert_eq!(assembly.origins().collect::<Vec<_>>(), vec![2, 5, 8]);
        assert_eq!(assembly.len(), 3);
    }

    #[test]
    fn test_refuses_overwrite() {
        let mut assembly = ColumnAssembly::new(1, b"a".to_vec());
        assert!(assembly.insert(1, b"b".to_vec()).is_err());
        assert_eq!(assembly.get(1), Some(&b"a"[..]));
    }
}
