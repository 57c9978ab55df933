//! Command line driver: generate a random dataset, sort it on a mesh and report the timings.
use clap::Parser;
use log::info;

use meshsort::generate::{random_dataset, run_seed};
use meshsort::report::{RunRecord, Summary, CSV_HEADER};
use meshsort::timing::{PhaseTimings, Stage};
use meshsort::{sort_on_local_mesh, Capacity, Error, MeshConfig, Result, DEFAULT_CAPACITY};

/// meshsort command-line interface
#[derive(Parser)]
#[command(
    name = "meshsort",
    version,
    about = "Rank-based sort of a random string on a square mesh"
)]
struct Cli {
    /// Total number of characters; each participant receives message_size / participants
    message_size: usize,

    /// Participants of the in-process mesh, a perfect square
    #[arg(short = 'n', long, default_value_t = 4, env = "MESHSORT_PARTICIPANTS")]
    participants: usize,

    /// Maximum number of bytes in a single message
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Seed for the dataset; run i uses seed + i, wrapping at the maximum
    #[arg(long)]
    seed: Option<u64>,

    /// Number of runs
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// Print one CSV row per run instead of the timing lines
    #[arg(long)]
    csv: bool,

    /// Print the sorted string
    #[arg(long)]
    print: bool,

    /// Check the output against a serial sort
    #[arg(long)]
    verify: bool,

    /// Run on the MPI world communicator instead of an in-process mesh
    #[cfg(feature = "mpi")]
    #[arg(long)]
    mpi: bool,
}

/// Root-side bookkeeping across runs.
struct Session<'a> {
    cli: &'a Cli,
    records: Vec<RunRecord>,
}

impl<'a> Session<'a> {
    fn new(cli: &'a Cli) -> Self {
        if cli.csv {
            println!("{CSV_HEADER}");
        }
        Self {
            cli,
            records: Vec::with_capacity(cli.repeat),
        }
    }

    fn dataset(&self, run: usize, elements: usize) -> Vec<u8> {
        random_dataset(elements, run_seed(self.cli.seed, run))
    }

    fn finish_run(
        &mut self,
        participants: usize,
        dataset: &[u8],
        output: Option<Vec<u8>>,
        timings: &PhaseTimings,
    ) -> Result<()> {
        let output =
            output.ok_or_else(|| Error::Protocol("root produced no output".to_string()))?;
        if self.cli.verify {
            let mut expected = dataset.to_vec();
            expected.sort_unstable();
            if expected != output {
                return Err(Error::Protocol(
                    "mesh output differs from a serial sort".to_string(),
                ));
            }
            info!("output verified against a serial sort");
        }
        if self.cli.print {
            println!("{}", String::from_utf8_lossy(&output));
        }

        let record = RunRecord::new(participants, dataset.len(), timings);
        if self.cli.csv {
            println!("{}", record.csv_row());
        } else {
            println!("execution: {:.10}", record.execution);
            println!("computation: {:.10}", record.computation);
            println!("communication: {:.10}", record.communication);
            for stage in Stage::ALL {
                println!("  {stage}: {:.10}", timings.get(stage).as_secs_f64());
            }
        }
        self.records.push(record);
        Ok(())
    }

    fn summarize(&self) {
        if self.records.len() > 1 {
            if let Some(summary) = Summary::from_records(&self.records) {
                eprint!("{summary}");
            }
        }
    }
}

fn run_local(cli: &Cli) -> Result<()> {
    let config = MeshConfig::new(cli.participants, Capacity::new(cli.capacity))?;
    info!(
        "local mesh of {} participants, {} byte messages",
        cli.participants,
        config.capacity().bytes()
    );
    let elements = config.chunk_len(cli.message_size)? * cli.participants;
    let mut session = Session::new(cli);
    for run in 0..cli.repeat {
        let dataset = session.dataset(run, elements);
        let report = sort_on_local_mesh(config, &dataset)?;
        session.finish_run(cli.participants, &dataset, report.output, &report.timings)?;
    }
    session.summarize();
    Ok(())
}

#[cfg(feature = "mpi")]
fn run_mpi(cli: &Cli) -> Result<()> {
    use meshsort::transport::{MpiTransport, Transport};
    use meshsort::MeshSorter;

    let universe = mpi::initialize()
        .ok_or_else(|| Error::Transport("MPI is already initialised".to_string()))?;
    let transport = MpiTransport::new(universe.world());
    let participants = transport.size();
    let config = MeshConfig::new(participants, Capacity::new(cli.capacity))?;
    let elements = config.chunk_len(cli.message_size)? * participants;
    let sorter = MeshSorter::new(&transport, config)?;

    let mut session = sorter.is_root().then(|| Session::new(cli));
    for run in 0..cli.repeat {
        let dataset = session.as_ref().map(|s| s.dataset(run, elements));
        let report = sorter.sort_dataset(dataset.as_deref())?;
        if let (Some(session), Some(dataset)) = (session.as_mut(), dataset.as_deref()) {
            session.finish_run(participants, dataset, report.output, &report.timings)?;
        }
    }
    if let Some(session) = &session {
        session.summarize();
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    #[cfg(feature = "mpi")]
    let outcome = if cli.mpi {
        run_mpi(&cli)
    } else {
        run_local(&cli)
    };
    #[cfg(not(feature = "mpi"))]
    let outcome = run_local(&cli);

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
