/// Sort key selection over the three record columns.
use std::fmt;

use super::compare::should_swap;
use crate::records::Record;

/// Column a run sorts by. Column indices follow the file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Id,
    FirstName,
    LastName,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Id, SortKey::FirstName, SortKey::LastName];

    pub fn from_index(index: usize) -> Option<SortKey> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            SortKey::Id => 0,
            SortKey::FirstName => 1,
            SortKey::LastName => 2,
        }
    }

    /// Borrow this column out of a record.
    #[inline]
    pub fn select(self, record: &Record) -> KeyRef<'_> {
        match self {
            SortKey::Id => KeyRef::Int(record.id),
            SortKey::FirstName => KeyRef::Text(&record.first_name),
            SortKey::LastName => KeyRef::Text(&record.last_name),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Id => "ID",
            SortKey::FirstName => "FirstName",
            SortKey::LastName => "LastName",
        })
    }
}

/// A borrowed key value. Both sides of a comparison always come from the
/// same column, so the variants never get compared against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyRef<'a> {
    Int(i64),
    Text(&'a str),
}

/// Key column plus direction for a run. Fixed once the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::ascending(SortKey::Id)
    }
}

impl SortSpec {
    pub fn new(key: SortKey, ascending: bool) -> Self {
        SortSpec { key, ascending }
    }

    pub fn ascending(key: SortKey) -> Self {
        Self::new(key, true)
    }

    pub fn descending(key: SortKey) -> Self {
        Self::new(key, false)
    }

    /// True when `a` must come after `b` under this spec.
    #[inline]
    pub fn should_swap(&self, a: &Record, b: &Record) -> bool {
        should_swap(&self.key.select(a), &self.key.select(b), self.ascending)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = if self.ascending { "ascending" } else { "descending" };
        write!(f, "{} {}", self.key, order)
    }
}
