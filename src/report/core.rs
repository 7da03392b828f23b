/// Text rendering of run notices and algorithm comparisons.
use std::io::{self, Write};
use std::time::Duration;

use crate::controller::{Failure, Notice, RunReport};
use crate::engine::Algorithm;

/// Width of the rule under the record table header.
const RULE_WIDTH: usize = 60;

/// Write timings and the leading sorted records.
pub fn write_report<W: Write>(report: &RunReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "File Load Time : {:.4} seconds", report.load.as_secs_f64())?;
    writeln!(out, "Sorting Time   : {:.4} seconds", report.sort.as_secs_f64())?;
    writeln!(out, "Total Time     : {:.4} seconds", report.total().as_secs_f64())?;
    writeln!(out)?;

    let shown = report.shown();
    writeln!(out, "First {} Sorted Records", shown.len())?;
    out.write_all(&[b'-'; RULE_WIDTH])?;
    out.write_all(b"\n")?;

    let mut id = itoa::Buffer::new();
    for record in shown {
        out.write_all(id.format(record.id).as_bytes())?;
        out.write_all(b" | ")?;
        out.write_all(record.first_name.as_bytes())?;
        out.write_all(b" | ")?;
        out.write_all(record.last_name.as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

pub fn write_cancelled<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Sorting cancelled by user.")
}

pub fn write_failed<W: Write>(failure: &Failure, out: &mut W) -> io::Result<()> {
    writeln!(out, "Sorting failed ({})", failure)
}

/// Turns a stream of notices into terminal output: a `Running....` line on
/// `err` while progress ticks arrive, the outcome on `out`.
#[derive(Debug, Default)]
pub struct Renderer {
    dots: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<O: Write, E: Write>(
        &mut self,
        notice: &Notice,
        out: &mut O,
        err: &mut E,
    ) -> io::Result<()> {
        match notice {
            Notice::Progress { .. } => {
                if self.dots == 0 {
                    err.write_all(b"Running")?;
                }
                err.write_all(b".")?;
                self.dots += 1;
                err.flush()
            }
            Notice::Completed(report) => {
                self.end_progress(err)?;
                write_report(report, out)?;
                out.flush()
            }
            Notice::Cancelled => {
                self.end_progress(err)?;
                write_cancelled(out)?;
                out.flush()
            }
            Notice::Failed(failure) => {
                self.end_progress(err)?;
                write_failed(failure, err)?;
                err.flush()
            }
        }
    }

    /// Terminate a pending `Running...` line, if any.
    pub fn end_progress<E: Write>(&mut self, err: &mut E) -> io::Result<()> {
        if self.dots > 0 {
            self.dots = 0;
            err.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Sort time of one algorithm in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub algorithm: Algorithm,
    pub sort: Duration,
}

impl From<&RunReport> for Timing {
    fn from(report: &RunReport) -> Self {
        Timing {
            algorithm: report.algorithm,
            sort: report.sort,
        }
    }
}

/// The quickest entry; the earliest one wins a tie.
pub fn fastest(timings: &[Timing]) -> Option<&Timing> {
    timings.iter().min_by_key(|t| t.sort)
}

pub fn write_comparison<W: Write>(timings: &[Timing], out: &mut W) -> io::Result<()> {
    for (i, timing) in timings.iter().enumerate() {
        let label = format!("{}:", timing.algorithm);
        writeln!(
            out,
            "{}. {:<16}{:.6} seconds",
            i + 1,
            label,
            timing.sort.as_secs_f64()
        )?;
    }
    if let Some(best) = fastest(timings) {
        writeln!(out)?;
        writeln!(
            out,
            "Fastest algorithm: {} ({:.6} seconds)",
            best.algorithm,
            best.sort.as_secs_f64()
        )?;
    }
    Ok(())
}
