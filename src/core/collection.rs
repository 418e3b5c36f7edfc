//! Small array utilities shared by the domain, stacking and zoom code.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::core::types::Value;

/// Smallest value of a mixed number/date slice.
///
/// Dates compare by timestamp. The result is a date when any input is a date.
#[must_use]
pub fn min_value(values: &[Value]) -> Option<Value> {
    extreme_value(values, f64::min)
}

/// Largest value of a mixed number/date slice.
#[must_use]
pub fn max_value(values: &[Value]) -> Option<Value> {
    extreme_value(values, f64::max)
}

fn extreme_value(values: &[Value], pick: fn(f64, f64) -> f64) -> Option<Value> {
    let first = values.first()?;
    let extreme = values
        .iter()
        .map(|value| value.as_f64())
        .fold(first.as_f64(), pick);
    Some(Value::from_f64(extreme, contains_dates(values)))
}

/// Minimum of finite values, `None` for an empty (or all-NaN) input.
#[must_use]
pub fn min_f64<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .reduce(f64::min)
}

#[must_use]
pub fn max_f64<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values
        .into_iter()
        .filter(|value| !value.is_nan())
        .reduce(f64::max)
}

#[must_use]
pub fn contains_dates(values: &[Value]) -> bool {
    values.iter().any(|value| value.is_date())
}

/// Order-insensitive equality: same length and every element of each side
/// appears on the other.
#[must_use]
pub fn are_sets_equal<T: PartialEq>(left: &[T], right: &[T]) -> bool {
    left.len() == right.len()
        && left.iter().all(|item| right.contains(item))
        && right.iter().all(|item| left.contains(item))
}

/// Splits `items` into contiguous runs separated by delimiter elements.
///
/// Delimiters are dropped and empty runs are omitted, so
/// `[a, |, b, c, |, |, d]` yields `[[a], [b, c], [d]]`.
pub fn split_array<T, F>(items: &[T], mut is_delimiter: F) -> Vec<&[T]>
where
    F: FnMut(&T) -> bool,
{
    items
        .split(|item| is_delimiter(item))
        .filter(|run| !run.is_empty())
        .collect()
}

/// Deduplicates while keeping first-seen order.
#[must_use]
pub fn uniq<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    items.into_iter().collect::<IndexSet<T>>().into_iter().collect()
}
