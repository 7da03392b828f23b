/// The three benchmarked sorting strategies.
///
/// Every strategy takes ownership of the dataset and gives it back only on
/// success. A cancelled call returns `None` and drops the (possibly half
/// reordered) buffer, so a partial ordering can never escape.
///
/// Check points:
/// - exchange: once per outer pass
/// - insertion: once per outer element
/// - merge: on entry to every recursive call and before every merge comparison
use std::fmt;

use super::cancel::CancelObserver;
use super::key::SortSpec;
use crate::records::Record;

/// Strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Bubble-style adjacent exchange. O(n^2), in place.
    Exchange,
    /// Incremental insertion. O(n^2), in place.
    Insertion,
    /// Top-down merge building a fresh sequence per merge. O(n log n), O(n) extra per level.
    Merge,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Exchange, Algorithm::Insertion, Algorithm::Merge];

    /// Quadratic strategies are gated behind a confirmation on large inputs.
    pub fn is_quadratic(self) -> bool {
        matches!(self, Algorithm::Exchange | Algorithm::Insertion)
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Exchange => "Bubble Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Merge => "Merge Sort",
        }
    }

    /// Sort with an arbitrary element type and ordering predicate.
    /// `should_swap(a, b)` must return true exactly when `a` belongs after `b`.
    pub fn sort_by<T, F>(
        self,
        data: Vec<T>,
        should_swap: F,
        cancel: &CancelObserver,
    ) -> Option<Vec<T>>
    where
        F: FnMut(&T, &T) -> bool,
    {
        match self {
            Algorithm::Exchange => {
                let mut data = data;
                exchange_sort(&mut data, should_swap, cancel).then_some(data)
            }
            Algorithm::Insertion => {
                let mut data = data;
                insertion_sort(&mut data, should_swap, cancel).then_some(data)
            }
            Algorithm::Merge => merge_sort(data, should_swap, cancel),
        }
    }

    /// Sort records by `spec`. `None` means the run was cancelled.
    pub fn sort(
        self,
        data: Vec<Record>,
        spec: &SortSpec,
        cancel: &CancelObserver,
    ) -> Option<Vec<Record>> {
        self.sort_by(data, |a, b| spec.should_swap(a, b), cancel)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Free-function form of [`Algorithm::sort`].
#[inline]
pub fn sort(
    algorithm: Algorithm,
    data: Vec<Record>,
    spec: &SortSpec,
    cancel: &CancelObserver,
) -> Option<Vec<Record>> {
    algorithm.sort(data, spec, cancel)
}

/// Adjacent-exchange sort in place. Returns false if cancelled; the slice
/// is then in an unspecified order.
pub fn exchange_sort<T, F>(data: &mut [T], mut should_swap: F, cancel: &CancelObserver) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    let n = data.len();
    for pass in 0..n {
        if cancel.is_requested() {
            return false;
        }
        for j in 0..n - pass - 1 {
            if should_swap(&data[j], &data[j + 1]) {
                data.swap(j, j + 1);
            }
        }
    }
    true
}

/// Insertion sort in place: each element is compared leftward and the
/// run of larger elements shifted one slot right.
pub fn insertion_sort<T, F>(data: &mut [T], mut should_swap: F, cancel: &CancelObserver) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    for i in 1..data.len() {
        if cancel.is_requested() {
            return false;
        }
        let mut j = i;
        while j > 0 && should_swap(&data[j - 1], &data[i]) {
            j -= 1;
        }
        data[j..=i].rotate_right(1);
    }
    true
}

/// Merge sort over an owned arena.
///
/// Recursion works on index ranges of `data`; each merge allocates a new
/// index sequence, which keeps the O(n)-per-level allocation profile the
/// benchmark compares against the in-place strategies. Records are moved
/// into their final order once, after the last merge.
pub fn merge_sort<T, F>(
    data: Vec<T>,
    mut should_swap: F,
    cancel: &CancelObserver,
) -> Option<Vec<T>>
where
    F: FnMut(&T, &T) -> bool,
{
    let order = merge_range(&data, 0, data.len(), &mut should_swap, cancel)?;
    let mut slots: Vec<Option<T>> = data.into_iter().map(Some).collect();
    Some(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

fn merge_range<T, F>(
    arena: &[T],
    lo: usize,
    hi: usize,
    should_swap: &mut F,
    cancel: &CancelObserver,
) -> Option<Vec<usize>>
where
    F: FnMut(&T, &T) -> bool,
{
    if cancel.is_requested() {
        return None;
    }
    if hi - lo <= 1 {
        return Some((lo..hi).collect());
    }

    let mid = lo + (hi - lo) / 2;
    let left = merge_range(arena, lo, mid, should_swap, cancel)?;
    let right = merge_range(arena, mid, hi, should_swap, cancel)?;
    merge(arena, &left, &right, should_swap, cancel)
}

/// Merge two ordered index runs into a new one. Ties go to the left run,
/// which keeps equal keys in input order.
fn merge<T, F>(
    arena: &[T],
    left: &[usize],
    right: &[usize],
    should_swap: &mut F,
    cancel: &CancelObserver,
) -> Option<Vec<usize>>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        if cancel.is_requested() {
            return None;
        }
        if should_swap(&arena[left[i]], &arena[right[j]]) {
            merged.push(right[j]);
            j += 1;
        } else {
            merged.push(left[i]);
            i += 1;
        }
    }

    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    Some(merged)
}
