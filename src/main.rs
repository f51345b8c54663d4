use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;

use leibniz_pi::report;
use leibniz_pi::{AggregateResult, Job, Outcome, ProcessMode, Runner, Strategy, WorkerCommand};

#[derive(Parser, Debug)]
#[command(
    name = "leibniz-pi",
    about = "Approximate pi with the Leibniz series and compare concurrency strategies.",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "Strategies run in this order: Leibniz, Leibniz-Power(10), Fixed-Threads, \
                  Process-Pool, Producer-Consumer, Thread-Pool."
)]
struct Cli {
    /// Number of series terms to sum.
    #[arg(short = 'n', long, default_value_t = 100_000_000)]
    iterations: u64,
    /// Terms per task for the queue, pool and dynamic process strategies.
    #[arg(short, long, default_value_t = 5_000_000)]
    batch_size: u64,
    /// Worker threads for the fixed-partition and producer/consumer strategies.
    #[arg(short, long, default_value_t = 4)]
    threads: usize,
    /// Worker processes for the process pool.
    #[arg(short, long, default_value_t = 4)]
    processes: usize,
    /// Run the fixed-partition thread strategy.
    #[arg(long)]
    fixed_threads: bool,
    /// Run the producer/consumer task-queue strategy.
    #[arg(long)]
    producer_consumer: bool,
    /// Run the thread-pool strategy with K threads.
    #[arg(long, value_name = "K")]
    thread_pool: Option<usize>,
    /// Run the process-pool strategy.
    #[arg(long)]
    process_pool: bool,
    /// How the process pool hands out ranges.
    #[arg(long, value_enum, default_value_t = ProcessModeArg::Static)]
    process_mode: ProcessModeArg,
    /// Print only the approximation of each strategy, one line per successful
    /// strategy in run order, no table.
    #[arg(long)]
    only_pi: bool,
    /// Hosts for distributed execution. Not supported; accepted and ignored.
    #[arg(long, value_delimiter = ',', value_name = "HOST")]
    hosts: Vec<String>,
    /// Program launched for process-pool workers instead of this executable.
    #[arg(long, value_name = "PATH", hide = true)]
    worker_program: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve ranges on stdin, answering partial sums on stdout.
    #[command(hide = true)]
    Worker,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProcessModeArg {
    Static,
    Dynamic,
}

impl From<ProcessModeArg> for ProcessMode {
    fn from(mode: ProcessModeArg) -> Self {
        match mode {
            ProcessModeArg::Static => ProcessMode::Static,
            ProcessModeArg::Dynamic => ProcessMode::Dynamic,
        }
    }
}

impl Cli {
    fn jobs(&self) -> leibniz_pi::Result<Vec<Job>> {
        let total: u64 = self.iterations;
        let batch: u64 = self.batch_size;
        let run_all: bool = !(self.fixed_threads
            || self.producer_consumer
            || self.thread_pool.is_some()
            || self.process_pool);

        let mut jobs: Vec<Job> = Vec::new();
        if run_all {
            jobs.push(Job::new(total, 1, batch, Strategy::Serial)?);
            jobs.push(Job::new(total, 1, batch, Strategy::SerialCheckpointed)?);
        }
        if run_all || self.fixed_threads {
            jobs.push(Job::new(total, self.threads, batch, Strategy::FixedThreads)?);
        }
        if run_all || self.process_pool {
            let strategy: Strategy = Strategy::ProcessPool(self.process_mode.into());
            jobs.push(Job::new(total, self.processes, batch, strategy)?);
        }
        if run_all || self.producer_consumer {
            jobs.push(Job::new(total, self.threads, batch, Strategy::ProducerConsumer)?);
        }
        if run_all || self.thread_pool.is_some() {
            let size: usize = self.thread_pool.unwrap_or(self.threads);
            jobs.push(Job::new(total, size, batch, Strategy::ThreadPool)?);
        }
        Ok(jobs)
    }

    fn runner(&self) -> leibniz_pi::Result<Runner> {
        match &self.worker_program {
            Some(program) => Ok(Runner::new(WorkerCommand::new(program))),
            None => Runner::current_exe(),
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Some(Command::Worker) = cli.command {
        let stdin = io::stdin();
        let stdout = io::stdout();
        leibniz_pi::process::serve_worker(stdin.lock(), stdout.lock())?;
        return Ok(());
    }

    if !cli.hosts.is_empty() {
        warn!(hosts = ?cli.hosts, "distributed execution is not supported, ignoring --hosts");
    }

    let jobs: Vec<Job> = cli.jobs()?;
    let runner: Runner = cli.runner()?;
    let outcomes: Vec<Outcome> = runner.run_all(&jobs);

    let mut results: Vec<AggregateResult> = Vec::with_capacity(outcomes.len());
    let mut failures: usize = 0;
    for outcome in outcomes {
        match outcome.result {
            Ok(result) => results.push(result),
            Err(error) => {
                failures += 1;
                eprintln!("{}: failed: {}", outcome.strategy, error);
            }
        }
    }

    if cli.only_pi {
        for result in results.iter() {
            println!("{}", report::format_pi(result.pi_approx));
        }
    } else {
        print!("{}", report::format_table(&results));
    }

    if failures > 0 {
        bail!("{} of {} strategies failed", failures, jobs.len());
    }
    Ok(())
}
