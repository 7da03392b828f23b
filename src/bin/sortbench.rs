use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossbeam_channel::{Receiver, select};
use tracing_subscriber::EnvFilter;

use sortbench::common::reset_sigpipe;
use sortbench::controller::{
    BenchConfig, ChannelSink, ControlSurface, DEFAULT_DISPLAY_LIMIT,
    DEFAULT_QUADRATIC_WARNING_THRESHOLD, ExecutionController, Notice, RunRequest, StartOutcome,
    parse_row_count,
};
use sortbench::engine::{Algorithm, SortKey, SortSpec};
use sortbench::records::{CsvSource, RecordSource};
use sortbench::report::{Renderer, Timing, write_comparison};

const EXIT_DECLINED: i32 = 1;
const EXIT_FAILED: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    /// Bubble-style exchange sort, O(n^2)
    Exchange,
    /// Insertion sort, O(n^2)
    Insertion,
    /// Top-down merge sort, O(n log n)
    Merge,
    /// Run all three and compare sort times
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyArg {
    Id,
    FirstName,
    LastName,
}

impl From<KeyArg> for SortKey {
    fn from(key: KeyArg) -> Self {
        match key {
            KeyArg::Id => SortKey::Id,
            KeyArg::FirstName => SortKey::FirstName,
            KeyArg::LastName => SortKey::LastName,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sortbench",
    about = "Time bubble, insertion and merge sort over CSV records",
    after_help = "While a sort is running, type 'c' and press Enter to cancel it."
)]
struct Cli {
    /// Sorting algorithm to run
    #[arg(short = 'a', long = "algorithm", value_enum, default_value_t = AlgorithmArg::Merge)]
    algorithm: AlgorithmArg,

    /// Column to sort by
    #[arg(short = 'k', long = "key", value_enum, default_value_t = KeyArg::Id)]
    key: KeyArg,

    /// Sort in descending order
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Number of rows to load
    #[arg(short = 'n', long = "rows", value_name = "N", default_value = "10000")]
    rows: String,

    /// Ask before running a quadratic sort on more rows than this
    #[arg(
        long = "warn-threshold",
        value_name = "N",
        default_value_t = DEFAULT_QUADRATIC_WARNING_THRESHOLD
    )]
    warn_threshold: usize,

    /// Answer yes to the slow-algorithm warning
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Number of sorted records to print
    #[arg(long = "limit", value_name = "N", default_value_t = DEFAULT_DISPLAY_LIMIT)]
    limit: usize,

    /// Progress indicator cadence in milliseconds
    #[arg(
        long = "progress-ms",
        value_name = "MS",
        default_value_t = 500,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    progress_ms: u64,

    /// CSV file: a header line, then id,first_name,last_name rows
    file: PathBuf,
}

/// Interactive answer to the quadratic warning, read from the stdin line feed.
struct Prompt<'a> {
    lines: &'a Receiver<String>,
    assume_yes: bool,
}

impl ControlSurface for Prompt<'_> {
    fn confirm_quadratic(&self, request: &RunRequest) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!(
            "sortbench: {} is O(n\u{b2}) and {} rows may take a long time. Continue? [y/N] ",
            request.algorithm,
            request.rows
        );
        let _ = io::stderr().flush();
        match self.lines.recv() {
            Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn main() {
    reset_sigpipe();

    let filter =
        EnvFilter::try_from_env("SORTBENCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("sortbench: {:#}", e);
            process::exit(EXIT_FAILED);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let rows = parse_row_count(&cli.rows)?;
    let spec = SortSpec::new(cli.key.into(), !cli.reverse);
    let config = BenchConfig {
        quadratic_warning_threshold: cli.warn_threshold,
        display_limit: cli.limit,
        progress_interval: Duration::from_millis(cli.progress_ms),
    };

    let algorithms: Vec<Algorithm> = match cli.algorithm {
        AlgorithmArg::Exchange => vec![Algorithm::Exchange],
        AlgorithmArg::Insertion => vec![Algorithm::Insertion],
        AlgorithmArg::Merge => vec![Algorithm::Merge],
        AlgorithmArg::All => Algorithm::ALL.to_vec(),
    };
    let compare = algorithms.len() > 1;

    let (sink, notices) = ChannelSink::new();
    let controller = ExecutionController::new(config, Arc::new(sink));
    let source: Arc<dyn RecordSource> = Arc::new(CsvSource::new(&cli.file));
    let lines = spawn_line_reader();
    let prompt = Prompt {
        lines: &lines,
        assume_yes: cli.yes,
    };

    let mut renderer = Renderer::new();
    let mut timings = Vec::new();

    for algorithm in algorithms {
        let request = RunRequest::new(algorithm, spec, rows);
        if let StartOutcome::Declined = controller.start(request, Arc::clone(&source), &prompt)? {
            eprintln!("sortbench: {} run declined", algorithm);
            return Ok(EXIT_DECLINED);
        }

        match drive(&controller, &notices, &lines, &mut renderer, !compare)? {
            Notice::Completed(report) => timings.push(Timing::from(&report)),
            Notice::Cancelled => return Ok(EXIT_CANCELLED),
            _ => return Ok(EXIT_FAILED),
        }
    }

    if compare {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_comparison(&timings, &mut out)?;
        out.flush()?;
    }
    Ok(0)
}

/// Control loop for one run: render notices as they arrive and forward
/// cancel commands typed on stdin. Returns the run's terminal notice.
fn drive(
    controller: &ExecutionController,
    notices: &Receiver<Notice>,
    lines: &Receiver<String>,
    renderer: &mut Renderer,
    show_report: bool,
) -> anyhow::Result<Notice> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut lines = lines.clone();

    loop {
        select! {
            recv(notices) -> notice => {
                let notice = notice?;
                match &notice {
                    Notice::Completed(_) if !show_report => {
                        renderer.end_progress(&mut stderr.lock())?;
                    }
                    _ => renderer.render(&notice, &mut stdout.lock(), &mut stderr.lock())?,
                }
                if notice.is_terminal() {
                    return Ok(notice);
                }
            }
            recv(lines) -> line => match line {
                Ok(line) if is_cancel_command(&line) => {
                    controller.cancel();
                }
                Ok(_) => {}
                // stdin closed: stop listening instead of spinning on it.
                Err(_) => lines = crossbeam_channel::never(),
            }
        }
    }
}

fn is_cancel_command(line: &str) -> bool {
    matches!(line.trim(), "c" | "C" | "cancel" | "q" | "quit")
}

/// Feed stdin lines into a channel so prompts and the control loop share one reader.
fn spawn_line_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let spawned = thread::Builder::new()
        .name("sortbench-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "stdin reader unavailable; cancel commands disabled");
    }
    rx
}
