//! Small set/array helpers over `PartialEq` slices.
//!
//! Domains are short and often hold values that are neither `Hash` nor `Ord`
//! (`&str`, enums, floats), so these are plain quadratic scans that keep the
//! left-hand order.

/// Returns the values in `a` that are not in `b`, in `a`'s order.
pub fn subtract<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter().filter(|value| !b.contains(value)).cloned().collect()
}

/// Returns the values that are only in `a` OR `b` but not both.
pub fn symmetric_difference<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = subtract(a, b);
    out.extend(subtract(b, a));
    out
}

/// Removes repeated values, keeping the first occurrence of each.
///
/// Returns the deduplicated values and how many were dropped.
pub fn dedup_stable<T: PartialEq>(values: Vec<T>) -> (Vec<T>, usize) {
    let total = values.len();
    let mut out: Vec<T> = Vec::with_capacity(total);
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    let dropped = total - out.len();
    (out, dropped)
}

/// Returns the values that occur more than once in `values`, once each.
pub fn repeated<T: PartialEq + Clone>(values: &[T]) -> Vec<T> {
    let mut seen: Vec<&T> = Vec::new();
    let mut out: Vec<T> = Vec::new();
    for value in values {
        if seen.contains(&value) {
            if !out.contains(value) {
                out.push(value.clone());
            }
        } else {
            seen.push(value);
        }
    }
    out
}
