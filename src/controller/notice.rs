//! What the controller tells the outside world about a run.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use super::config::RunRequest;
use crate::common::{Error, ErrorKind};
use crate::engine::{Algorithm, SortSpec};
use crate::records::Record;

/// Timing and output of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub algorithm: Algorithm,
    pub spec: SortSpec,
    pub load: Duration,
    pub sort: Duration,
    pub records: Vec<Record>,
    pub display_limit: usize,
}

impl RunReport {
    pub fn total(&self) -> Duration {
        self.load + self.sort
    }

    /// The leading records a report displays.
    pub fn shown(&self) -> &[Record] {
        &self.records[..self.records.len().min(self.display_limit)]
    }
}

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn internal(message: impl Into<String>) -> Self {
        Failure {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl From<&Error> for Failure {
    fn from(e: &Error) -> Self {
        Failure {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Cosmetic heartbeat while a run is active. Ticks count from 1 per run.
    Progress { tick: u64 },
    Completed(RunReport),
    Cancelled,
    Failed(Failure),
}

impl Notice {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notice::Progress { .. })
    }
}

/// Receives notices from the reporter thread of a run.
pub trait ResultSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<F> ResultSink for F
where
    F: Fn(Notice) + Send + Sync,
{
    fn notify(&self, notice: Notice) {
        self(notice)
    }
}

/// Forwards notices into a channel, for callers that prefer to pull.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Notice>,
}

impl ChannelSink {
    pub fn new() -> (ChannelSink, Receiver<Notice>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (ChannelSink { tx }, rx)
    }
}

impl ResultSink for ChannelSink {
    fn notify(&self, notice: Notice) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.tx.send(notice);
    }
}

/// The control surface consulted before an expensive run.
pub trait ControlSurface {
    /// Asked when a quadratic algorithm is requested on more rows than the
    /// configured threshold. Returning false abandons the start.
    fn confirm_quadratic(&self, request: &RunRequest) -> bool;
}

/// Confirms everything. For non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ControlSurface for AlwaysConfirm {
    fn confirm_quadratic(&self, _request: &RunRequest) -> bool {
        true
    }
}
