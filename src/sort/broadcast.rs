//! Distribution of the diagonal's column content along its row.
use super::MeshSorter;
use crate::transport::{Tag, Transport};
use crate::types::{Phase, Result};

impl<T: Transport> MeshSorter<'_, T> {
    /// Return the column content of this row's diagonal.
    ///
    /// The diagonal sends its own `column` to every other member of the row; the other members
    /// ignore their `column` and receive.
    pub fn broadcast(&self, column: &[u8]) -> Result<Vec<u8>> {
        let topology = self.topology();
        let id = self.id();
        let (row, _) = topology.coordinates(id);

        if topology.is_diagonal(id) {
            self.capacity().check(Phase::Broadcast, column.len())?;
            for member in topology.row_members(row).filter(|&member| member != id) {
                self.send_checked(member, Tag::Exchange, Phase::Broadcast, column)?;
            }
            Ok(column.to_vec())
        } else {
            self.receive_checked(topology.diagonal(row), Tag::Exchange, Phase::Broadcast)
        }
    }
}
