//! Meshsort
//!
//! Distributed rank-based sort of a character sequence over a square mesh of `k x k`
//! participants. Each participant computes how many elements of its column are smaller than each
//! element of its row; summing these counts along a row gives every element its position in the
//! sorted output, which the root then assembles.
//!
//! Participants communicate through a [`transport::Transport`]. An in-process backend,
//! [`transport::LocalMesh`], runs each participant on a thread; with the `mpi` feature,
//! `transport::MpiTransport` runs one participant per MPI rank.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod assembly;
pub mod config;
pub mod generate;
pub mod report;
pub mod sort;
pub mod timing;
pub mod topology;
pub mod transport;
pub mod types;

pub use config::{Capacity, MeshConfig, DEFAULT_CAPACITY, ROOT};
pub use sort::{sort_on_local_mesh, MeshSorter, SortReport};
pub use types::{Error, Phase, Result};
