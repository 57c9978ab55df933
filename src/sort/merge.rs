//! Final permutation on the root.
use itertools::Itertools;

use crate::types::{Error, Result};

/// Every row's data with its global ranks, concatenated in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalRankTable {
    data: Vec<u8>,
    ranks: Vec<usize>,
}

impl GlobalRankTable {
    /// Append one row. `ranks` must have one entry per element of `data`.
    pub fn push_row(&mut self, data: &[u8], ranks: Vec<usize>) -> Result<()> {
        if data.len() != ranks.len() {
            return Err(Error::Protocol(format!(
                "row of {} elements arrived with {} ranks",
                data.len(),
                ranks.len()
            )));
        }
        self.data.extend_from_slice(data);
        self.ranks.extend(ranks);
        Ok(())
    }

    /// Number of ranked elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in gather order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Global rank of each element.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Elements ordered by rank.
    pub fn merge(&self) -> Vec<u8> {
        merge_by_rank(&self.data, &self.ranks)
    }
}

/// Order `data` by ascending `ranks`, ties broken by value.
pub fn merge_by_rank(data: &[u8], ranks: &[usize]) -> Vec<u8> {
    ranks
        .iter()
        .zip(data)
        .map(|(&rank, &c)| (rank, c))
        .sorted_unstable()
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_merge_by_rank() {
        assert_eq!(merge_by_rank(b"DCBA", &[3, 2, 1, 0]), b"ABCD".to_vec());
        assert_eq!(merge_by_rank(b"BAB", &[1, 0, 1]), b"ABB".to_vec());
    }

    #[test]
    fn test_table_rows() {
        let mut table = GlobalRankTable::default();
        table.push_row(b"zy", vec![3, 2]).unwrap();
        table.push_row(b"ab", vec![0, 1]).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.data(), b"zyab");
        assert_eq!(table.merge(), b"abyz".to_vec());
        assert!(table.push_row(b"q", vec![]).is_err());
    }
}
