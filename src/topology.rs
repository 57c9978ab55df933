//! Addressing of participants on a square mesh.
//!
//! Participants are numbered in row-major order, so participant `id` sits at row `id / k` and
//! column `id % k` of a `k x k` grid. Columns are treated as rings for the gossip exchange.

use crate::types::{Error, Result};
use num::integer::Roots;

/// A `k x k` arrangement of participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTopology {
    side: usize,
}

impl MeshTopology {
    /// Create a mesh from the number of participants, which must be a non-zero perfect square.
    pub fn from_participants(participants: usize) -> Result<Self> {
        let side = participants.sqrt();
        if participants == 0 || side * side != participants {
            return Err(Error::NotPerfectSquare { participants });
        }
        Ok(Self { side })
    }

    /// Side length `k` of the grid.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of participants `k * k`.
    pub fn participants(&self) -> usize {
        self.side * self.side
    }

    /// Row and column of a participant.
    pub fn coordinates(&self, id: usize) -> (usize, usize) {
        (id / self.side, id % self.side)
    }

    /// Participant at the given row and column.
    pub fn id(&self, row: usize, col: usize) -> usize {
        row * self.side + col
    }

    /// Next participant down the column ring.
    pub fn below(&self, id: usize) -> usize {
        let (row, col) = self.coordinates(id);
        self.id((row + 1) % self.side, col)
    }

    /// Previous participant up the column ring.
    pub fn above(&self, id: usize) -> usize {
        let (row, col) = self.coordinates(id);
        self.id((row + self.side - 1) % self.side, col)
    }

    /// The participant at `(row, row)`.
    pub fn diagonal(&self, row: usize) -> usize {
        self.id(row, row)
    }

    /// Whether the participant lies on the diagonal of its row.
    pub fn is_diagonal(&self, id: usize) -> bool {
        let (row, col) = self.coordinates(id);
        row == col
    }

    /// Participant whose chunk arrives at `id` in the given gossip round.
    ///
    /// In round `t` every participant forwards the chunk that started `t` rows above it, so the
    /// chunk arriving from above originated `t + 1` rows up the ring: `(id - k(t + 1)) mod P`.
    pub fn gossip_origin(&self, id: usize, round: usize) -> usize {
        let participants = self.participants();
        let shift = (self.side * (round + 1)) % participants;
        (id + participants - shift) % participants
    }

    /// Participants of a column, in row order.
    pub fn column_members(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.side).map(move |row| self.id(row, col))
    }

    /// Participants of a row, in column order.
    pub fn row_members(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.side).map(move |col| self.id(row, col))
    }
}
