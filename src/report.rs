//! Timing records of benchmark runs and their summary statistics.
use std::fmt;

use itertools::Itertools;

use crate::timing::PhaseTimings;

/// Header of the CSV rows written by [`RunRecord`].
pub const CSV_HEADER: &str = "participants,elements,execution,computation,communication";

/// Root-side timing of one run, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRecord {
    /// Number of participants.
    pub participants: usize,
    /// Number of sorted elements.
    pub elements: usize,
    /// Run time without the final permutation.
    pub execution: f64,
    /// Local sort and rank counting time.
    pub computation: f64,
    /// Execution time that is not computation.
    pub communication: f64,
}

impl RunRecord {
    /// Record from the root's timings.
    pub fn new(participants: usize, elements: usize, timings: &PhaseTimings) -> Self {
        Self {
            participants,
            elements,
            execution: timings.execution().as_secs_f64(),
            computation: timings.computation().as_secs_f64(),
            communication: timings.communication().as_secs_f64(),
        }
    }

    /// One CSV row matching [`CSV_HEADER`].
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{:.10},{:.10},{:.10}",
            self.participants, self.elements, self.execution, self.computation, self.communication
        )
    }
}

/// Mean, sample standard deviation and range of one measured quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation, zero for a single sample.
    pub std: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
}

impl Statistics {
    /// Statistics of `samples`, or `None` when there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let (min, max) = samples.iter().copied().minmax_by(f64::total_cmp).into_option()?;
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let std = if samples.len() > 1 {
            (samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Self {
            mean,
            std,
            min,
            max,
        })
    }
}

/// Statistics over repeated runs of the same configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of participants.
    pub participants: usize,
    /// Number of sorted elements.
    pub elements: usize,
    /// Number of runs.
    pub runs: usize,
    /// Execution time.
    pub execution: Statistics,
    /// Computation time.
    pub computation: Statistics,
    /// Communication time.
    pub communication: Statistics,
}

impl Summary {
    /// Summarise `records`, which must all share one configuration.
    pub fn from_records(records: &[RunRecord]) -> Option<Self> {
        let first = records.first()?;
        if records
            .iter()
            .any(|r| r.participants != first.participants || r.elements != first.elements)
        {
            return None;
        }
        let column = |f: fn(&RunRecord) -> f64| records.iter().map(f).collect::<Vec<_>>();
        Some(Self {
            participants: first.participants,
            elements: first.elements,
            runs: records.len(),
            execution: Statistics::from_samples(&column(|r| r.execution))?,
            computation: Statistics::from_samples(&column(|r| r.computation))?,
            communication: Statistics::from_samples(&column(|r| r.communication))?,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} participants, {} elements, {} runs",
            self.participants, self.elements, self.runs
        )?;
        for (name, stats) in [
            ("execution", &self.execution),
            ("computation", &self.computation),
            ("communication", &self.communication),
        ] {
            writeln!(
                f,
                "  {name:<13} mean {:.6}  std {:.6}  min {:.6}  max {:.6}",
                stats.mean, stats.std, stats.min, stats.max
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(execution: f64) -> RunRecord {
        RunRecord {
            participants: 4,
            elements: 100,
            execution,
            computation: 1.0,
            communication: execution - 1.0,
        }
    }

    #[test]
    fn test_statistics() {
        let stats = Statistics::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert!((stats.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(Statistics::from_samples(&[]).is_none());
        assert_eq!(Statistics::from_samples(&[3.0]).unwrap().std, 0.0);
    }

    #[test]
    fn test_summary_requires_one_configuration() {
        let mut records = vec![record(2.0), record(4.0)];
        let summary = Summary::from_records(&records).unwrap();
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.execution.mean, 3.0);
        assert_eq!(summary.computation.std, 0.0);

        records[1].participants = 9;
        assert!(Summary::from_records(&records).is_none());
    }

    #[test]
    fn test_csv_row() {
        let row = record(2.5).csv_row();
        assert_eq!(row, "4,100,2.5000000000,1.0000000000,1.5000000000");
        assert_eq!(row.split(',').count(), CSV_HEADER.split(',').count());
    }
}
