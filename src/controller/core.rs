/// Run lifecycle: one worker thread sorts, one reporter thread emits
/// progress and the terminal notice, and the caller's thread only ever
/// takes short locks.
///
/// State machine: Idle -> Running -> {Completed, Cancelled, Failed}.
/// A terminal state stays visible through `state()` until the next run
/// starts; `start` is accepted from every state except Running.
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select};
use tracing::{debug, info, warn};

use super::config::{BenchConfig, RunRequest};
use super::notice::{ControlSurface, Failure, Notice, ResultSink, RunReport};
use crate::common::{Error, Result};
use crate::engine::{CancelObserver, CancellationToken};
use crate::records::{Record, RecordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionState::Completed | ExecutionState::Cancelled | ExecutionState::Failed
        )
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionState::Idle => "Idle",
            ExecutionState::Running => "Running",
            ExecutionState::Completed => "Completed",
            ExecutionState::Cancelled => "Cancelled",
            ExecutionState::Failed => "Failed",
        })
    }
}

/// Result of a `start` call that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A worker is running; `run` numbers runs from 1 per controller.
    Started { run: u64 },
    /// The control surface declined the quadratic-size warning.
    Declined,
}

/// What the worker hands back to the reporter.
enum Outcome {
    Sorted {
        load: Duration,
        sort: Duration,
        records: Vec<Record>,
    },
    Cancelled,
    Failed(Failure),
}

struct Slot {
    state: ExecutionState,
    run: u64,
    /// Last run whose terminal notice has been delivered.
    settled: u64,
    /// Writer half of the active run's token. Only the controller holds it.
    token: Option<CancellationToken>,
}

impl Slot {
    fn is_settled(&self) -> bool {
        self.state != ExecutionState::Running && self.settled == self.run
    }
}

struct Shared {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct ExecutionController {
    config: BenchConfig,
    sink: Arc<dyn ResultSink>,
    shared: Arc<Shared>,
}

impl ExecutionController {
    pub fn new(config: BenchConfig, sink: Arc<dyn ResultSink>) -> Self {
        ExecutionController {
            config,
            sink,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: ExecutionState::Idle,
                    run: 0,
                    settled: 0,
                    token: None,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.shared.lock().state
    }

    /// Start a run in the background.
    ///
    /// Rejected with an IllegalState error while another run is active. If
    /// the previous run has finished but its terminal notice is still being
    /// delivered, waits for that delivery first; a sink must therefore not
    /// call `start` from inside `notify`. For quadratic algorithms
    /// above the warning threshold, `surface` is asked first and a refusal
    /// returns `Declined` without touching the state.
    pub fn start(
        &self,
        request: RunRequest,
        source: Arc<dyn RecordSource>,
        surface: &dyn ControlSurface,
    ) -> Result<StartOutcome> {
        if self.state() == ExecutionState::Running {
            warn!(algorithm = %request.algorithm, "start rejected: run in progress");
            return Err(Error::AlreadyRunning);
        }

        if request.needs_confirmation(self.config.quadratic_warning_threshold)
            && !surface.confirm_quadratic(&request)
        {
            debug!(algorithm = %request.algorithm, rows = request.rows.get(), "start declined");
            return Ok(StartOutcome::Declined);
        }

        let token = CancellationToken::new();
        let observer = token.observer();
        let run = {
            // A run that just finished may still be delivering its terminal
            // notice; the next run's notices must not overtake it.
            let mut slot = self
                .shared
                .changed
                .wait_while(self.shared.lock(), |slot| {
                    slot.state.is_terminal() && !slot.is_settled()
                })
                .unwrap_or_else(PoisonError::into_inner);
            // The confirmation prompt may have let another start slip in.
            if slot.state == ExecutionState::Running {
                warn!(algorithm = %request.algorithm, "start rejected: run in progress");
                return Err(Error::AlreadyRunning);
            }
            slot.run += 1;
            slot.state = ExecutionState::Running;
            slot.token = Some(token);
            slot.run
        };
        debug!(
            run,
            algorithm = %request.algorithm,
            spec = %request.spec,
            rows = request.rows.get(),
            "run started"
        );

        let (done_tx, done_rx) = crossbeam_channel::bounded::<Outcome>(1);

        let reporter = Reporter {
            run,
            request,
            interval: self.config.progress_interval,
            display_limit: self.config.display_limit,
            sink: Arc::clone(&self.sink),
            shared: Arc::clone(&self.shared),
        };
        if let Err(e) = thread::Builder::new()
            .name(format!("sortbench-reporter-{}", run))
            .spawn(move || reporter.watch(done_rx))
        {
            let failure = Failure::internal(format!("cannot spawn reporter thread: {}", e));
            settle(&self.shared, self.sink.as_ref(), run, Notice::Failed(failure.clone()));
            return Err(Error::Internal(failure.message));
        }

        // If this spawn fails, `done_tx` is dropped with the closure and the
        // reporter settles the run as failed.
        let spawned = thread::Builder::new()
            .name(format!("sortbench-worker-{}", run))
            .spawn(move || {
                let outcome = execute(&request, source.as_ref(), &observer);
                let _ = done_tx.send(outcome);
            });
        if let Err(e) = spawned {
            return Err(Error::Internal(format!("cannot spawn worker thread: {}", e)));
        }

        Ok(StartOutcome::Started { run })
    }

    /// Ask the active run to stop. Returns immediately; the worker notices at
    /// its next check point. Returns false (and does nothing) when no run is
    /// active.
    pub fn cancel(&self) -> bool {
        let slot = self.shared.lock();
        match (slot.state, slot.token.as_ref()) {
            (ExecutionState::Running, Some(token)) => {
                token.request();
                debug!(run = slot.run, "cancellation requested");
                true
            }
            _ => {
                debug!(state = %slot.state, "cancel ignored: no active run");
                false
            }
        }
    }

    /// Block until the current run (if any) has delivered its terminal notice.
    pub fn wait(&self) -> ExecutionState {
        let slot = self.shared.lock();
        let slot = self
            .shared
            .changed
            .wait_while(slot, |slot| !slot.is_settled())
            .unwrap_or_else(PoisonError::into_inner);
        slot.state
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ExecutionState> {
        let slot = self.shared.lock();
        let (slot, result) = self
            .shared
            .changed
            .wait_timeout_while(slot, timeout, |slot| !slot.is_settled())
            .unwrap_or_else(PoisonError::into_inner);
        if result.timed_out() {
            None
        } else {
            Some(slot.state)
        }
    }
}

impl Drop for ExecutionController {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Load then sort. Runs on the worker thread.
fn execute(request: &RunRequest, source: &dyn RecordSource, cancel: &CancelObserver) -> Outcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let load_start = Instant::now();
        let data = match source.load(request.rows) {
            Ok(data) => data,
            Err(e) => return Outcome::Failed(Failure::from(&e)),
        };
        let load = load_start.elapsed();
        debug!(rows = data.len(), ?load, "dataset loaded");

        let sort_start = Instant::now();
        match request.algorithm.sort(data, &request.spec, cancel) {
            Some(records) => Outcome::Sorted {
                load,
                sort: sort_start.elapsed(),
                records,
            },
            None => Outcome::Cancelled,
        }
    }));

    result.unwrap_or_else(|payload| {
        Outcome::Failed(Failure::internal(format!(
            "worker panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

/// Emits progress until the worker reports, then settles the run.
struct Reporter {
    run: u64,
    request: RunRequest,
    interval: Duration,
    display_limit: usize,
    sink: Arc<dyn ResultSink>,
    shared: Arc<Shared>,
}

impl Reporter {
    fn watch(self, done: Receiver<Outcome>) {
        // A zero interval would make the ticker spin.
        let ticker = crossbeam_channel::tick(self.interval.max(Duration::from_millis(1)));
        let mut tick = 0u64;

        let outcome = loop {
            select! {
                recv(done) -> msg => {
                    break msg.unwrap_or_else(|_| {
                        Outcome::Failed(Failure::internal("worker exited without a result"))
                    });
                }
                recv(ticker) -> _ => {
                    tick += 1;
                    self.sink.notify(Notice::Progress { tick });
                }
            }
        };

        let notice = match outcome {
            Outcome::Sorted {
                load,
                sort,
                records,
            } => {
                info!(
                    run = self.run,
                    algorithm = %self.request.algorithm,
                    rows = records.len(),
                    ?load,
                    ?sort,
                    "run completed"
                );
                Notice::Completed(RunReport {
                    algorithm: self.request.algorithm,
                    spec: self.request.spec,
                    load,
                    sort,
                    records,
                    display_limit: self.display_limit,
                })
            }
            Outcome::Cancelled => {
                info!(run = self.run, algorithm = %self.request.algorithm, "run cancelled");
                Notice::Cancelled
            }
            Outcome::Failed(failure) => {
                info!(run = self.run, kind = %failure.kind, error = %failure.message, "run failed");
                Notice::Failed(failure)
            }
        };

        settle(&self.shared, self.sink.as_ref(), self.run, notice);
    }
}

/// Move `run` to its terminal state, deliver the notice, then wake waiters.
fn settle(shared: &Shared, sink: &dyn ResultSink, run: u64, notice: Notice) {
    let state = match &notice {
        Notice::Completed(_) => ExecutionState::Completed,
        Notice::Cancelled => ExecutionState::Cancelled,
        _ => ExecutionState::Failed,
    };

    {
        let mut slot = shared.lock();
        if slot.run != run {
            return;
        }
        slot.state = state;
        slot.token = None;
    }

    sink.notify(notice);

    let mut slot = shared.lock();
    slot.settled = slot.settled.max(run);
    drop(slot);
    shared.changed.notify_all();
}
