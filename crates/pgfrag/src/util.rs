//! Small, pure helpers used while assembling SQL.
//!
//! - [`pad`]: zero-padding for small non-negative integers
//! - [`wait`]: async delay
//! - [`map_with_separator`] / [`try_map_with_separator`]: map a slice and
//!   intersperse a separator value between the results
//! - [`trim_obj`]: drop unspecified columns from a [`Row`]
//! - [`complete_keys_with_default_value`]: give every row of a batch the same
//!   columns, in the same order
//!
//! None of these mutate their inputs.

use crate::error::{FragError, FragResult};
use indexmap::{IndexMap, IndexSet};
use std::time::Duration;

/// A row to be written: column name -> optional value, in insertion order.
///
/// `None` marks a column the caller left unspecified; it is dropped by
/// [`trim_obj`].
pub type Row<V> = IndexMap<String, Option<V>>;

/// A row with all unspecified columns removed.
pub type TrimmedRow<V> = IndexMap<String, V>;

/// Minimum output length for [`pad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadWidth {
    #[default]
    Two = 2,
    Three = 3,
    Four = 4,
}

impl PadWidth {
    /// The width as a character count.
    pub fn as_usize(self) -> usize {
        self as usize
    }
}

/// Zero-pad a small non-negative integer to at least `width` digits.
///
/// Numbers that already have `width` or more digits are returned as-is, so the
/// output can be longer than `width`.
///
/// # Errors
///
/// Returns [`FragError::InvalidInput`] for negative `n`.
///
/// # Example
/// ```
/// use pgfrag::util::{pad, PadWidth};
///
/// assert_eq!(pad(7, PadWidth::Two).unwrap(), "07");
/// assert_eq!(pad(42, PadWidth::Four).unwrap(), "0042");
/// assert_eq!(pad(12345, PadWidth::Three).unwrap(), "12345");
/// ```
pub fn pad(n: i64, width: PadWidth) -> FragResult<String> {
    if n < 0 {
        return Err(FragError::invalid_input(format!(
            "pad: expected a non-negative integer, got {n}"
        )));
    }
    Ok(format!("{:0width$}", n, width = width.as_usize()))
}

/// Sleep for `delay` on the tokio timer.
pub async fn wait(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// One element of the output of [`map_with_separator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interleaved<T, S> {
    /// A transformed input element.
    Item(T),
    /// The separator placed between two items.
    Separator(S),
}

impl<T, S> Interleaved<T, S> {
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator(_))
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Self::Item(v) => Some(v),
            Self::Separator(_) => None,
        }
    }
}

impl<T> Interleaved<T, T> {
    /// Unwrap when items and separators share a type.
    pub fn into_inner(self) -> T {
        match self {
            Self::Item(v) | Self::Separator(v) => v,
        }
    }
}

/// Map `items` through `transform`, placing `separator` between consecutive
/// results.
///
/// `transform` receives the element, its index and the whole slice. The output
/// has `2n - 1` elements for `n > 0` inputs and is empty otherwise.
///
/// # Example
/// ```
/// use pgfrag::util::{map_with_separator, Interleaved};
///
/// let out = map_with_separator(&[1, 2, 3], ", ", |x, _, _| x * 10);
/// assert_eq!(
///     out,
///     vec![
///         Interleaved::Item(10),
///         Interleaved::Separator(", "),
///         Interleaved::Item(20),
///         Interleaved::Separator(", "),
///         Interleaved::Item(30),
///     ]
/// );
/// ```
pub fn map_with_separator<T, S, U, F>(
    items: &[T],
    separator: S,
    mut transform: F,
) -> Vec<Interleaved<U, S>>
where
    S: Clone,
    F: FnMut(&T, usize, &[T]) -> U,
{
    let mut out = Vec::with_capacity((items.len() * 2).saturating_sub(1));
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(Interleaved::Separator(separator.clone()));
        }
        out.push(Interleaved::Item(transform(item, i, items)));
    }
    out
}

/// Fallible [`map_with_separator`].
///
/// Stops at the first error from `transform` and returns it unchanged.
pub fn try_map_with_separator<T, S, U, E, F>(
    items: &[T],
    separator: S,
    mut transform: F,
) -> Result<Vec<Interleaved<U, S>>, E>
where
    S: Clone,
    F: FnMut(&T, usize, &[T]) -> Result<U, E>,
{
    let mut out = Vec::with_capacity((items.len() * 2).saturating_sub(1));
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(Interleaved::Separator(separator.clone()));
        }
        out.push(Interleaved::Item(transform(item, i, items)?));
    }
    Ok(out)
}

/// Copy `row`, keeping only the columns that have a value.
///
/// Retained columns keep their original order.
pub fn trim_obj<V: Clone>(row: &Row<V>) -> TrimmedRow<V> {
    row.iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
        .collect()
}

/// Ordered union of the column names of `rows`: first-seen order, scanning
/// rows left to right and each row in insertion order.
pub fn union_keys<V>(rows: &[TrimmedRow<V>]) -> IndexSet<&str> {
    rows.iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect()
}

/// Trim every row, then give each one every column that appears in any row.
///
/// Columns are ordered by [`union_keys`]. A column missing from a row gets a
/// clone of `default`, so filled slots never alias each other.
///
/// # Example
/// ```
/// use pgfrag::util::{complete_keys_with_default_value, Row};
///
/// let a: Row<&str> = [("x".to_string(), Some("1"))].into_iter().collect();
/// let b: Row<&str> = [("y".to_string(), Some("2"))].into_iter().collect();
///
/// let out = complete_keys_with_default_value(&[a, b], "DEFAULT");
/// assert_eq!(out[0].get_index(0), Some((&"x".to_string(), &"1")));
/// assert_eq!(out[0].get_index(1), Some((&"y".to_string(), &"DEFAULT")));
/// assert_eq!(out[1].get_index(0), Some((&"x".to_string(), &"DEFAULT")));
/// assert_eq!(out[1].get_index(1), Some((&"y".to_string(), &"2")));
/// ```
pub fn complete_keys_with_default_value<V: Clone>(rows: &[Row<V>], default: V) -> Vec<TrimmedRow<V>> {
    let trimmed: Vec<TrimmedRow<V>> = rows.iter().map(trim_obj).collect();
    let keys = union_keys(&trimmed);

    trimmed
        .iter()
        .map(|row| {
            keys.iter()
                .map(|&key| {
                    let value = row.get(key).cloned().unwrap_or_else(|| default.clone());
                    (key.to_string(), value)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;

    fn row(entries: &[(&str, Option<i64>)]) -> Row<i64> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect()
    }

    fn keys<V>(row: &TrimmedRow<V>) -> Vec<&str> {
        row.keys().map(String::as_str).collect()
    }

    #[test]
    fn pad_defaults_to_two() {
        assert_eq!(pad(0, PadWidth::default()).unwrap(), "00");
        assert_eq!(pad(5, PadWidth::default()).unwrap(), "05");
        assert_eq!(pad(59, PadWidth::default()).unwrap(), "59");
    }

    #[test]
    fn pad_wider_widths() {
        assert_eq!(pad(7, PadWidth::Three).unwrap(), "007");
        assert_eq!(pad(7, PadWidth::Four).unwrap(), "0007");
        assert_eq!(pad(999, PadWidth::Four).unwrap(), "0999");
    }

    #[test]
    fn pad_overflows_through() {
        assert_eq!(pad(123, PadWidth::Two).unwrap(), "123");
        assert_eq!(pad(2024, PadWidth::Three).unwrap(), "2024");
        assert_eq!(pad(99999, PadWidth::Four).unwrap(), "99999");
    }

    #[test]
    fn pad_rejects_negative() {
        let err = pad(-1, PadWidth::Two).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn wait_sleeps_for_at_least_delay() {
        let start = std::time::Instant::now();
        wait(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn map_with_separator_empty_and_single() {
        let empty: Vec<Interleaved<i32, &str>> = map_with_separator(&[], ",", |x: &i32, _, _| *x);
        assert!(empty.is_empty());

        let one = map_with_separator(&[3], ",", |x, _, _| *x);
        assert_eq!(one, vec![Interleaved::Item(3)]);
    }

    #[test]
    fn map_with_separator_passes_index_and_slice() {
        let out = map_with_separator(&["a", "b"], 0usize, |x, i, all| format!("{x}{i}/{}", all.len()));
        assert_eq!(
            out,
            vec![
                Interleaved::Item("a0/2".to_string()),
                Interleaved::Separator(0),
                Interleaved::Item("b1/2".to_string()),
            ]
        );
    }

    #[test]
    fn into_inner_flattens_same_type() {
        let joined: String = map_with_separator(&["a", "b", "c"], ", ", |x, _, _| *x)
            .into_iter()
            .map(Interleaved::into_inner)
            .collect();
        assert_eq!(joined, "a, b, c");
    }

    #[test]
    fn try_map_with_separator_propagates_first_error() {
        let mut calls = 0;
        let res: Result<Vec<Interleaved<i32, char>>, String> =
            try_map_with_separator(&[1, 2, 3], ',', |x, _, _| {
                calls += 1;
                if *x == 2 { Err(format!("bad {x}")) } else { Ok(*x) }
            });
        assert_eq!(res.unwrap_err(), "bad 2");
        assert_eq!(calls, 2);
    }

    #[test]
    fn trim_obj_drops_none_and_keeps_order() {
        let input = row(&[("b", Some(1)), ("a", None), ("c", Some(3))]);
        let trimmed = trim_obj(&input);
        assert_eq!(keys(&trimmed), vec!["b", "c"]);
        // input untouched
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn trim_obj_all_none_is_empty() {
        let input = row(&[("a", None), ("b", None)]);
        assert!(trim_obj(&input).is_empty());
    }

    #[test]
    fn complete_keys_empty_batch() {
        let out = complete_keys_with_default_value::<i64>(&[], -1);
        assert!(out.is_empty());
    }

    #[test]
    fn complete_keys_single_row_is_trimmed_form() {
        let input = row(&[("x", Some(1)), ("y", None)]);
        let out = complete_keys_with_default_value(std::slice::from_ref(&input), -1);
        assert_eq!(out, vec![trim_obj(&input)]);
    }

    #[test]
    fn complete_keys_fills_missing_columns() {
        let out = complete_keys_with_default_value(&[row(&[("x", Some(1))]), row(&[("y", Some(2))])], -1);
        assert_eq!(keys(&out[0]), vec!["x", "y"]);
        assert_eq!(keys(&out[1]), vec!["x", "y"]);
        assert_eq!(out[0]["x"], 1);
        assert_eq!(out[0]["y"], -1);
        assert_eq!(out[1]["x"], -1);
        assert_eq!(out[1]["y"], 2);
    }

    #[test]
    fn complete_keys_none_only_counts_when_set_elsewhere() {
        let out = complete_keys_with_default_value(
            &[
                row(&[("a", None), ("b", Some(1))]),
                row(&[("c", Some(2)), ("a", None)]),
            ],
            0,
        );
        // `a` is never set, so it never enters the union
        assert_eq!(keys(&out[0]), vec!["b", "c"]);

        let out = complete_keys_with_default_value(
            &[row(&[("a", None), ("b", Some(1))]), row(&[("a", Some(5))])],
            0,
        );
        assert_eq!(keys(&out[0]), vec!["b", "a"]);
        assert_eq!(out[0]["a"], 0);
        assert_eq!(out[1]["a"], 5);
    }

    #[test]
    fn complete_keys_first_seen_order() {
        let out = complete_keys_with_default_value(
            &[
                row(&[("z", Some(1)), ("m", Some(2))]),
                row(&[("a", Some(3)), ("z", Some(4))]),
            ],
            0,
        );
        assert_eq!(keys(&out[0]), vec!["z", "m", "a"]);
        assert_eq!(keys(&out[1]), vec!["z", "m", "a"]);
        assert_eq!(out[1]["z"], 4);
    }

    fn arb_row() -> impl Strategy<Value = Row<i64>> {
        vec(("[a-e]", proptest::option::of(0i64..100)), 0..6)
            .prop_map(|entries| entries.into_iter().collect::<Row<i64>>())
    }

    proptest! {
        #[test]
        fn pad_length_and_value(n in 0i64..100_000, w in prop_oneof![
            Just(PadWidth::Two), Just(PadWidth::Three), Just(PadWidth::Four)
        ]) {
            let s = pad(n, w).unwrap();
            prop_assert!(s.len() >= w.as_usize());
            prop_assert_eq!(s.parse::<i64>().unwrap(), n);
            if n.to_string().len() >= w.as_usize() {
                prop_assert_eq!(s, n.to_string());
            }
        }

        #[test]
        fn interleave_shape(items in vec(any::<i32>(), 0..20)) {
            let out = map_with_separator(&items, i64::MIN, |x, _, _| i64::from(*x));
            prop_assert_eq!(out.len(), (items.len() * 2).saturating_sub(1));
            for (idx, el) in out.iter().enumerate() {
                if idx % 2 == 0 {
                    prop_assert_eq!(el, &Interleaved::Item(i64::from(items[idx / 2])));
                } else {
                    prop_assert_eq!(el, &Interleaved::Separator(i64::MIN));
                }
            }
        }

        #[test]
        fn trim_is_idempotent(r in arb_row()) {
            let once = trim_obj(&r);
            let lifted: Row<i64> = once.iter().map(|(k, v)| (k.clone(), Some(*v))).collect();
            prop_assert_eq!(trim_obj(&lifted), once.clone());
            prop_assert!(once.keys().all(|k| r.contains_key(k)));
        }

        #[test]
        fn completed_rows_share_union_keys(rows in vec(arb_row(), 1..6)) {
            let out = complete_keys_with_default_value(&rows, -1);
            prop_assert_eq!(out.len(), rows.len());

            let trimmed: Vec<TrimmedRow<i64>> = rows.iter().map(trim_obj).collect();
            let union: Vec<&str> = union_keys(&trimmed).into_iter().collect();
            for (orig, done) in trimmed.iter().zip(&out) {
                prop_assert_eq!(keys(done), union.clone());
                for (k, v) in done {
                    match orig.get(k) {
                        Some(orig_v) => prop_assert_eq!(v, orig_v),
                        None => prop_assert_eq!(*v, -1),
                    }
                }
            }
        }

        #[test]
        fn union_is_order_independent_as_a_set(rows in vec(btree_map("[a-e]", 0i64..9, 0..4), 1..5)) {
            let rows: Vec<Row<i64>> = rows
                .into_iter()
                .map(|m| m.into_iter().map(|(k, v)| (k, Some(v))).collect())
                .collect();
            let forward: std::collections::BTreeSet<String> =
                complete_keys_with_default_value(&rows, 0)[0].keys().cloned().collect();
            let mut reversed = rows.clone();
            reversed.reverse();
            let backward: std::collections::BTreeSet<String> =
                complete_keys_with_default_value(&reversed, 0)[0].keys().cloned().collect();
            prop_assert_eq!(forward, backward);
        }
    }
}
