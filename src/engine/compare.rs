/// Ordering predicate shared by all three algorithms.
///
/// Every algorithm moves an element only when `should_swap` holds, and the
/// predicate is strict, so equal keys never trade places.

/// True when `a` belongs after `b`: `a > b` ascending, `a < b` descending.
#[inline]
pub fn should_swap<K: PartialOrd + ?Sized>(a: &K, b: &K, ascending: bool) -> bool {
    if ascending { a > b } else { a < b }
}

/// Check that no adjacent pair violates `should_swap`.
pub fn is_ordered_by<T, F>(data: &[T], mut should_swap: F) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    data.windows(2).all(|w| !should_swap(&w[0], &w[1]))
}
