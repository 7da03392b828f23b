/// Record model and the sources that load records for a run.
///
/// The on-disk format is a plain CSV file with one header line followed by
/// `id,first_name,last_name` rows. Fields may be double-quoted, and quoted
/// fields may contain commas.
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use rayon::prelude::*;

use crate::common::io::read_file;
use crate::common::{Error, Result, io_error_msg};

/// Row counts at or above this are converted on the rayon pool.
/// Below it the thread hand-off costs more than the conversion.
const PARALLEL_PARSE_THRESHOLD: usize = 16 * 1024;

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Record {
    pub fn new(id: i64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Record {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.id, self.first_name, self.last_name)
    }
}

/// Supplies the records for a run. Called from the worker thread.
pub trait RecordSource: Send + Sync {
    /// Load at most `max_rows` records, in source order.
    fn load(&self, max_rows: NonZeroUsize) -> Result<Vec<Record>>;
}

/// Records read from a CSV file with a header line.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }
}

impl RecordSource for CsvSource {
    fn load(&self, max_rows: NonZeroUsize) -> Result<Vec<Record>> {
        let data = read_file(&self.path).map_err(|e| Error::MissingResource {
            path: self.path.clone(),
            message: io_error_msg(&e),
        })?;

        parse_records(&self.path, &data, max_rows.get())
    }
}

/// Parse up to `max_rows` data rows out of CSV bytes. The first line is the
/// header; rows whose fields are all blank are skipped. Errors name the
/// 1-based line of the offending row.
pub fn parse_records(path: &Path, data: &[u8], max_rows: usize) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::with_capacity(max_rows.min(data.len() / 8 + 1));
    let mut iter = reader.records();
    // Never pull a row past the limit; it may be malformed.
    while rows.len() < max_rows {
        let Some(row) = iter.next() else { break };
        let row = row.map_err(|e| csv_error(path, &e))?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line = row.position().map_or(0, |p| p.line() as usize);
        rows.push((line, row));
    }

    let convert = |(line, row): &(usize, StringRecord)| to_record(path, *line, row);
    if rows.len() >= PARALLEL_PARSE_THRESHOLD {
        rows.par_iter().map(convert).collect()
    } else {
        rows.iter().map(convert).collect()
    }
}

fn csv_error(path: &Path, e: &csv::Error) -> Error {
    let line = e.position().map_or(0, |p| p.line() as usize);
    let message = match e.kind() {
        csv::ErrorKind::Utf8 { .. } => "not valid UTF-8".to_string(),
        _ => e.to_string(),
    };
    Error::MalformedRow {
        path: path.to_path_buf(),
        line,
        message,
    }
}

fn to_record(path: &Path, line: usize, row: &StringRecord) -> Result<Record> {
    let malformed = |message: String| Error::MalformedRow {
        path: path.to_path_buf(),
        line,
        message,
    };

    if row.len() != 3 {
        return Err(malformed(format!("expected 3 fields, found {}", row.len())));
    }

    let id = row[0]
        .parse::<i64>()
        .map_err(|_| malformed(format!("invalid id '{}'", &row[0])))?;

    Ok(Record::new(id, &row[1], &row[2]))
}

/// Records held in memory. Each load hands out a fresh copy of the prefix,
/// so repeated runs never observe each other's reordering.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        MemorySource { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for MemorySource {
    fn from(records: Vec<Record>) -> Self {
        MemorySource::new(records)
    }
}

impl RecordSource for MemorySource {
    fn load(&self, max_rows: NonZeroUsize) -> Result<Vec<Record>> {
        Ok(self.records.iter().take(max_rows.get()).cloned().collect())
    }
}
