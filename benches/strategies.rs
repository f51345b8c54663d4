use std::time::Instant;

use leibniz_pi::partition::{self, ChunkRange};
use leibniz_pi::{report, series};
use leibniz_pi::{AggregateResult, Job, Outcome, ProcessMode, Runner, Strategy, ThreadManager};
use leibniz_pi::WorkerCommand;

const ITERATIONS: u64 = 20_000_000;
const BATCH: u64 = 1_000_000;
const WORKERS: usize = 4;

#[test]
fn strategies_bench() {
    println!("Benchmarking..\n");
    let runner: Runner = Runner::new(WorkerCommand::new(env!("CARGO_BIN_EXE_leibniz-pi")));
    let strategies: [Strategy; 7] = [
        Strategy::Serial,
        Strategy::SerialCheckpointed,
        Strategy::FixedThreads,
        Strategy::ProcessPool(ProcessMode::Static),
        Strategy::ProcessPool(ProcessMode::Dynamic),
        Strategy::ProducerConsumer,
        Strategy::ThreadPool,
    ];

    let jobs: Vec<Job> = strategies
        .iter()
        .map(|strategy| Job::new(ITERATIONS, WORKERS, BATCH, *strategy).unwrap())
        .collect();

    let now: Instant = Instant::now();
    let outcomes: Vec<Outcome> = runner.run_all(&jobs);
    let results: Vec<AggregateResult> = outcomes
        .into_iter()
        .map(|outcome| outcome.result.unwrap())
        .collect();

    print!("{}", report::format_table(&results));
    println!("\nTime: {}", now.elapsed().as_millis());
}

#[test]
fn batch_size_bench() {
    println!("[PROCESS POOL BATCH SIZES]");
    let runner: Runner = Runner::new(WorkerCommand::new(env!("CARGO_BIN_EXE_leibniz-pi")));
    for batch in [10_000_u64, 100_000, 1_000_000, 5_000_000] {
        let strategy: Strategy = Strategy::ProcessPool(ProcessMode::Dynamic);
        let job: Job = Job::new(ITERATIONS, WORKERS, batch, strategy).unwrap();
        let result: AggregateResult = runner.run(&job).unwrap();
        println!("Batch {} | Time {}ms", batch, result.elapsed.as_millis());
    }
}

fn write_thread_metrics(manager: &ThreadManager<f64>) {
    let busy_threads: usize = manager.busy_threads();
    let active_threads: usize = manager.active_threads();
    let job_queue: usize = manager.pending_jobs();

    print!(
        "\x1B[2KThreads: {}/{} | Job Queue: {}\r",
        busy_threads, active_threads, job_queue
    );
}

#[test]
fn pool_metrics_bench() {
    println!("[THREAD POOL]");
    let manager: ThreadManager<f64> = ThreadManager::new(WORKERS).unwrap();
    let ranges: Vec<ChunkRange> = partition::by_batch(ITERATIONS, BATCH / 10).unwrap();

    let now: Instant = Instant::now();
    for (idx, range) in ranges.into_iter().enumerate() {
        if idx % 50 == 0 {
            write_thread_metrics(&manager);
        }
        manager.execute(move || series::partial_sum(range)).unwrap();
    }

    let mut counter: usize = 0;
    while manager.pending_jobs() > 0 {
        counter += 1;
        if counter % 50 == 0 {
            write_thread_metrics(&manager);
        }
    }

    let distribution: Vec<usize> = manager.job_distribution();
    let partials: Vec<f64> = manager.join().unwrap();
    println!(
        "\nTasks: {} | Distribution: {:?} | Time {}ms",
        partials.len(),
        distribution,
        now.elapsed().as_millis()
    );
}
