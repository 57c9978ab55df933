//! Rank-based sort over a square mesh.
//!
//! Every participant starts with one chunk of the dataset. The run proceeds in lockstep phases:
//!
//! 1. gossip: each column circulates its chunks so every member holds the whole column,
//! 2. broadcast: the diagonal of row `r` sends column `r` to the rest of the row,
//! 3. local ranking: every participant counts, for each element of its row data, the elements of
//!    its own column that are strictly smaller,
//! 4. reduce: the row diagonal sums the row's counts, which gives global ranks for column `r`,
//! 5. gather: the diagonals send their rows and ranks to the root,
//! 6. merge: the root orders the elements by rank.
//!
//! A barrier separates the exchange phases from the ranking phase.
pub mod broadcast;
pub mod gossip;
pub mod merge;
pub mod ranking;
pub mod reduce;
pub mod scatter;

pub use merge::{merge_by_rank, GlobalRankTable};
pub use ranking::{local_rank, sorted_reference};

use std::time::Instant;

use log::{debug, error, info};

use crate::config::{Capacity, MeshConfig, ROOT};
use crate::timing::{PhaseTimings, Stage};
use crate::topology::MeshTopology;
use crate::transport::{LocalMesh, Tag, Transport};
use crate::types::{Error, Phase, Result};

/// Outcome of a run on one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct SortReport {
    /// The sorted dataset, present on the root only.
    pub output: Option<Vec<u8>>,
    /// Time spent in each stage on this participant.
    pub timings: PhaseTimings,
}

/// One participant's view of a mesh sort.
pub struct MeshSorter<'t, T: Transport> {
    transport: &'t T,
    config: MeshConfig,
}

impl<'t, T: Transport> MeshSorter<'t, T> {
    /// Bind a configuration to a transport spanning exactly the configured mesh.
    pub fn new(transport: &'t T, config: MeshConfig) -> Result<Self> {
        let expected = config.topology().participants();
        if transport.size() != expected {
            return Err(Error::MeshMismatch {
                expected,
                actual: transport.size(),
            });
        }
        Ok(Self { transport, config })
    }

    /// Identifier of this participant.
    pub fn id(&self) -> usize {
        self.transport.id()
    }

    /// Whether this participant assembles the output.
    pub fn is_root(&self) -> bool {
        self.id() == ROOT
    }

    /// Mesh addressing.
    pub fn topology(&self) -> &MeshTopology {
        self.config.topology()
    }

    /// Message capacity.
    pub fn capacity(&self) -> Capacity {
        self.config.capacity()
    }

    /// Scatter `dataset` from the root and sort it. Only the root passes a dataset.
    pub fn sort_dataset(&self, dataset: Option<&[u8]>) -> Result<SortReport> {
        let start = Instant::now();
        let mut timings = PhaseTimings::default();
        let output = timings
            .measure(Stage::Scatter, || self.scatter(dataset))
            .and_then(|chunk| self.run(chunk, &mut timings))
            .map_err(|e| self.fail(e))?;
        timings.set_total(start.elapsed());
        Ok(SortReport { output, timings })
    }

    /// Sort a dataset that is already distributed, one chunk per participant.
    pub fn sort_chunk(&self, chunk: Vec<u8>) -> Result<SortReport> {
        let start = Instant::now();
        let mut timings = PhaseTimings::default();
        let output = self
            .run(chunk, &mut timings)
            .map_err(|e| self.fail(e))?;
        timings.set_total(start.elapsed());
        Ok(SortReport { output, timings })
    }

    /// Send `payload` after checking its size against the capacity.
    fn send_checked(&self, dest: usize, tag: Tag, phase: Phase, payload: &[u8]) -> Result<()> {
        self.capacity().check(phase, payload.len())?;
        self.transport.send(dest, tag, payload)
    }

    /// Receive a message and reject it if it exceeds the capacity.
    fn receive_checked(&self, source: usize, tag: Tag, phase: Phase) -> Result<Vec<u8>> {
        let message = self.transport.receive(source, tag)?;
        self.capacity().check(phase, message.len())?;
        Ok(message)
    }

    /// Overlapped send and receive, both checked against the capacity.
    fn exchange_checked(
        &self,
        dest: usize,
        source: usize,
        tag: Tag,
        phase: Phase,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        self.capacity().check(phase, payload.len())?;
        let message = self.transport.exchange(dest, source, tag, payload)?;
        self.capacity().check(phase, message.len())?;
        Ok(message)
    }

    fn fail(&self, e: Error) -> Error {
        if !matches!(e, Error::Aborted) {
            error!("participant {}: {}", self.id(), e);
            self.transport.abort();
        }
        e
    }

    fn run(&self, chunk: Vec<u8>, timings: &mut PhaseTimings) -> Result<Option<Vec<u8>>> {
        let chunk_len = chunk.len();

        let assembly = timings.measure(Stage::Gossip, || self.gossip(chunk))?;
        let column = assembly.concatenate();
        let row_data = timings.measure(Stage::Broadcast, || self.broadcast(&column))?;

        self.transport.barrier()?;

        let reference = timings.measure(Stage::Sort, || sorted_reference(&column));
        let ranks = timings.measure(Stage::LocalRank, || local_rank(&reference, &row_data));
        debug!(
            "participant {} ranked {} elements against {} references",
            self.id(),
            ranks.len(),
            reference.len()
        );

        let Some(aggregated) = timings.measure(Stage::Reduce, || self.reduce_row(ranks))? else {
            return Ok(None);
        };
        let Some(table) = timings.measure(Stage::Gather, || self.gather(row_data, aggregated))?
        else {
            return Ok(None);
        };

        let expected = chunk_len * self.topology().participants();
        if table.len() != expected {
            return Err(Error::Protocol(format!(
                "gathered {} ranked elements, expected {expected}",
                table.len()
            )));
        }
        let output = timings.measure(Stage::Merge, || table.merge());
        info!("root assembled {} sorted elements", output.len());
        Ok(Some(output))
    }
}

/// Sort `dataset` on an in-process mesh and return the root's report.
pub fn sort_on_local_mesh(config: MeshConfig, dataset: &[u8]) -> Result<SortReport> {
    let mesh = LocalMesh::new(config.topology().participants());
    let mut reports = mesh.run(|transport| {
        let sorter = MeshSorter::new(transport, config)?;
        let dataset = sorter.is_root().then_some(dataset);
        sorter.sort_dataset(dataset)
    })?;
    Ok(reports.swap_remove(ROOT))
}
