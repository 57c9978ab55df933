//! Per-run measurement of the time spent in each stage.
use std::fmt;
use std::time::{Duration, Instant};

/// A measured stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Distribution of the chunks.
    Scatter,
    /// Column gossip.
    Gossip,
    /// Diagonal broadcast.
    Broadcast,
    /// Sorting of the local reference set.
    Sort,
    /// Counting of strictly smaller elements.
    LocalRank,
    /// Row reduction.
    Reduce,
    /// Gather on the root.
    Gather,
    /// Final permutation on the root.
    Merge,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 8] = [
        Stage::Scatter,
        Stage::Gossip,
        Stage::Broadcast,
        Stage::Sort,
        Stage::LocalRank,
        Stage::Reduce,
        Stage::Gather,
        Stage::Merge,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scatter => "scatter",
            Stage::Gossip => "gossip",
            Stage::Broadcast => "broadcast",
            Stage::Sort => "sort",
            Stage::LocalRank => "local rank",
            Stage::Reduce => "reduce",
            Stage::Gather => "gather",
            Stage::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// Durations of the stages of one participant's run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimings {
    scatter: Duration,
    gossip: Duration,
    broadcast: Duration,
    sort: Duration,
    local_rank: Duration,
    reduce: Duration,
    gather: Duration,
    merge: Duration,
    total: Duration,
}

impl PhaseTimings {
    fn slot(&mut self, stage: Stage) -> &mut Duration {
        match stage {
            Stage::Scatter => &mut self.scatter,
            Stage::Gossip => &mut self.gossip,
            Stage::Broadcast => &mut self.broadcast,
            Stage::Sort => &mut self.sort,
            Stage::LocalRank => &mut self.local_rank,
            Stage::Reduce => &mut self.reduce,
            Stage::Gather => &mut self.gather,
            Stage::Merge => &mut self.merge,
        }
    }

    /// Run `f` and add its wall time to `stage`.
    pub fn measure<R>(&mut self, stage: Stage, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        *self.slot(stage) += start.elapsed();
        result
    }

    #[cfg(test)]
    fn record(&mut self, stage: Stage, elapsed: Duration) {
        *self.slot(stage) += elapsed;
    }

    /// Time spent in `stage`.
    pub fn get(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Scatter => self.scatter,
            Stage::Gossip => self.gossip,
            Stage::Broadcast => self.broadcast,
            Stage::Sort => self.sort,
            Stage::LocalRank => self.local_rank,
            Stage::Reduce => self.reduce,
            Stage::Gather => self.gather,
            Stage::Merge => self.merge,
        }
    }

    /// Set the wall time of the whole run.
    pub fn set_total(&mut self, total: Duration) {
        self.total = total;
    }

    /// Wall time of the whole run.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Whole run without the final permutation.
    pub fn execution(&self) -> Duration {
        self.total.saturating_sub(self.merge)
    }

    /// Local computation: reference sort plus rank counting.
    pub fn computation(&self) -> Duration {
        self.sort + self.local_rank
    }

    /// Everything in the execution time that is not local computation.
    pub fn communication(&self) -> Duration {
        self.execution().saturating_sub(self.computation())
    }
}
