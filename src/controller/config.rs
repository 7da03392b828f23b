use std::num::NonZeroUsize;
use std::time::Duration;

use crate::common::{Error, Result};
use crate::engine::{Algorithm, SortSpec};

/// Row count above which a quadratic algorithm needs confirmation.
pub const DEFAULT_QUADRATIC_WARNING_THRESHOLD: usize = 20_000;

/// Number of sorted records a report shows.
pub const DEFAULT_DISPLAY_LIMIT: usize = 100;

/// Cadence of progress notices while a run is active.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Controller-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub quadratic_warning_threshold: usize,
    pub display_limit: usize,
    pub progress_interval: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            quadratic_warning_threshold: DEFAULT_QUADRATIC_WARNING_THRESHOLD,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Everything one run needs besides its record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub algorithm: Algorithm,
    pub spec: SortSpec,
    pub rows: NonZeroUsize,
}

impl RunRequest {
    pub fn new(algorithm: Algorithm, spec: SortSpec, rows: NonZeroUsize) -> Self {
        RunRequest {
            algorithm,
            spec,
            rows,
        }
    }

    /// True when `threshold` makes this request subject to confirmation.
    pub fn needs_confirmation(&self, threshold: usize) -> bool {
        self.algorithm.is_quadratic() && self.rows.get() > threshold
    }
}

/// Parse a user-supplied row count. Accepts positive decimal integers only.
pub fn parse_row_count(s: &str) -> Result<NonZeroUsize> {
    s.trim()
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| Error::InvalidRowCount(s.to_string()))
}
