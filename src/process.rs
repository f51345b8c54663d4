//! Worker processes.
//!
//! Ranges and partial results cross the process boundary as bincode frames:
//! the parent writes a [`ChunkRange`] to the child's stdin, the child answers
//! with a [`PartialResult`] on its stdout. A child serves frames until its
//! stdin reaches end of file.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, info, trace};

use crate::aggregate::{self, PartialResult};
use crate::channel::TaskQueue;
use crate::error::{Error, Result};
use crate::job::ProcessMode;
use crate::partition::{self, ChunkRange};
use crate::series;
use crate::threads::join_scoped;

/// Program launched for each worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    /// `program worker`, the hidden subcommand of the `leibniz-pi` binary.
    pub fn new<P>(program: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::with_args(program, ["worker"])
    }

    pub fn with_args<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Re-launches the running executable as a worker.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    fn spawn(&self) -> io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
    }
}

/// Worker side of the protocol: answers every range read from `reader` with
/// its partial sum on `writer`. Returns the number of ranges served.
pub fn serve_worker<R, W>(reader: R, writer: W) -> Result<usize>
where
    R: Read,
    W: Write,
{
    let mut reader: BufReader<R> = BufReader::new(reader);
    let mut writer: BufWriter<W> = BufWriter::new(writer);
    let mut served: usize = 0;

    loop {
        // End of input is only clean on a frame boundary.
        if reader.fill_buf()?.is_empty() {
            break;
        }
        let range: ChunkRange = bincode::deserialize_from(&mut reader)?;
        if range.is_empty() || range.end > series::MAX_ITERATIONS {
            return Err(Error::invalid_config("range", "outside the summable terms"));
        }

        let partial: PartialResult = PartialResult {
            start: range.start,
            value: series::partial_sum(range),
        };
        bincode::serialize_into(&mut writer, &partial)?;
        writer.flush()?;
        served += 1;
    }

    trace!(served, "worker input closed");
    Ok(served)
}

struct WorkerProcess {
    id: usize,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    fn spawn(id: usize, command: &WorkerCommand) -> Result<Self> {
        let mut child: Child = command.spawn()?;
        let stdin: Option<ChildStdin> = child.stdin.take();
        let stdout: Option<ChildStdout> = child.stdout.take();

        let (stdin, stdout) = match (stdin, stdout) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                let error: io::Error = io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "worker process pipes unavailable",
                );
                return Err(Error::Io(error));
            }
        };

        trace!(worker = id, pid = child.id(), "worker process spawned");
        Ok(Self {
            id,
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
        })
    }

    fn send(&mut self, range: ChunkRange) -> Result<()> {
        let stdin: &mut BufWriter<ChildStdin> = self.stdin.as_mut().ok_or(Error::ChannelClosed)?;
        bincode::serialize_into(&mut *stdin, &range)?;
        stdin.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<PartialResult> {
        let partial: PartialResult = bincode::deserialize_from(&mut self.stdout)?;
        Ok(partial)
    }

    fn request(&mut self, range: ChunkRange) -> Result<PartialResult> {
        self.send(range)?;
        self.receive()
    }

    fn close_input(&mut self) {
        self.stdin.take();
    }

    /// Closes stdin and waits; a non-zero exit fails the run.
    fn finish(&mut self) -> Result<()> {
        self.close_input();
        let status: ExitStatus = self.child.wait()?;
        if !status.success() {
            return Err(Error::WorkerProcess {
                worker: self.id,
                status,
            });
        }
        Ok(())
    }

    /// Prefers the exit status over the pipe error it caused.
    fn explain(&mut self, error: Error) -> Error {
        match self.finish() {
            Err(exit_error @ Error::WorkerProcess { .. }) => exit_error,
            _ => error,
        }
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        self.close_input();
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

pub fn run(
    total: u64,
    worker_count: usize,
    batch_size: u64,
    mode: ProcessMode,
    command: &WorkerCommand,
) -> Result<f64> {
    match mode {
        ProcessMode::Static => run_static(total, worker_count, command),
        ProcessMode::Dynamic => run_dynamic(total, worker_count, batch_size, command),
    }
}

/// One process per worker-count range; every process is started before any
/// result is read.
pub fn run_static(total: u64, worker_count: usize, command: &WorkerCommand) -> Result<f64> {
    let ranges: Vec<ChunkRange> = partition::by_workers(total, worker_count)?;
    if ranges.is_empty() {
        return Ok(0.0);
    }

    let mut workers: Vec<WorkerProcess> = Vec::with_capacity(ranges.len());
    for (id, range) in ranges.iter().enumerate() {
        let mut worker: WorkerProcess = WorkerProcess::spawn(id, command)?;
        if let Err(error) = worker.send(*range) {
            return Err(worker.explain(error));
        }
        worker.close_input();
        workers.push(worker);
    }
    debug!(total, processes = workers.len(), "static worker processes started");

    let mut partials: Vec<PartialResult> = Vec::with_capacity(workers.len());
    for worker in workers.iter_mut() {
        match worker.receive() {
            Ok(partial) => partials.push(partial),
            Err(error) => return Err(worker.explain(error)),
        }
        worker.finish()?;
    }

    let pi: f64 = aggregate::sum_partials(&mut partials);
    info!(total, processes = partials.len(), pi, "process pool finished");
    Ok(pi)
}

/// Long-lived processes pulling batch ranges from a shared queue, one
/// request and response per range.
pub fn run_dynamic(
    total: u64,
    worker_count: usize,
    batch_size: u64,
    command: &WorkerCommand,
) -> Result<f64> {
    if worker_count == 0 {
        return Err(Error::invalid_config("worker_count", "must be at least 1"));
    }

    let ranges: Vec<ChunkRange> = partition::by_batch(total, batch_size)?;
    if ranges.is_empty() {
        return Ok(0.0);
    }

    let queue: TaskQueue<ChunkRange> = TaskQueue::new();
    for range in ranges.iter() {
        queue.push(*range)?;
    }
    queue.close();

    let processes: usize = worker_count.min(ranges.len());
    debug!(total, tasks = ranges.len(), processes, "dynamic worker processes starting");
    let queue: &TaskQueue<ChunkRange> = &queue;

    let collected: Vec<Vec<PartialResult>> = thread::scope(|scope| {
        let handles: Vec<io::Result<thread::ScopedJoinHandle<'_, Result<Vec<PartialResult>>>>> =
            (0..processes)
                .map(|id| {
                    thread::Builder::new()
                        .name(format!("leibniz-process-{}", id))
                        .spawn_scoped(scope, move || drive_worker(id, command, queue))
                })
                .collect();
        join_scoped(handles)
    })?;

    let mut partials: Vec<PartialResult> = collected.into_iter().flatten().collect();
    if partials.len() != ranges.len() {
        return Err(Error::MissingResults {
            expected: ranges.len(),
            received: partials.len(),
        });
    }

    let pi: f64 = aggregate::sum_partials(&mut partials);
    info!(total, tasks = partials.len(), processes, pi, "process pool finished");
    Ok(pi)
}

fn drive_worker(
    id: usize,
    command: &WorkerCommand,
    queue: &TaskQueue<ChunkRange>,
) -> Result<Vec<PartialResult>> {
    let mut worker: WorkerProcess = WorkerProcess::spawn(id, command)?;
    let mut partials: Vec<PartialResult> = Vec::new();

    while let Some(range) = queue.try_pop() {
        match worker.request(range) {
            Ok(partial) => partials.push(partial),
            Err(error) => return Err(worker.explain(error)),
        }
    }

    worker.finish()?;
    Ok(partials)
}
