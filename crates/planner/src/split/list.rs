use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// How row keys are distributed between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Element `i` goes to worker `i % parallelism`.
    #[default]
    RoundRobin,
    /// Blocks of `ceil(len / parallelism)` consecutive elements.
    Contiguous,
}

/// Splits `items` into exactly `parallelism` sub-lists, or none when `items` is empty.
///
/// Relative order is preserved inside each sub-list and no element is dropped
/// or duplicated. In contiguous mode trailing sub-lists may be short or empty.
///
/// # Panics
///
/// Panics if `parallelism` is zero.
pub fn split_list<T: Clone>(items: &[T], parallelism: usize, mode: SplitMode) -> Vec<Vec<T>> {
    assert!(parallelism > 0, "parallelism must be a positive integer");

    if items.is_empty() {
        return Vec::new();
    }

    match mode {
        SplitMode::RoundRobin => (0..parallelism)
            .map(|k| items.iter().skip(k).step_by(parallelism).cloned().collect())
            .collect(),
        SplitMode::Contiguous => {
            let block = items.len().div_ceil(parallelism);
            (0..parallelism)
                .map(|k| {
                    let start = (k * block).min(items.len());
                    let end = ((k + 1) * block).min(items.len());
                    items[start..end].to_vec()
                })
                .collect()
        }
    }
}

/// Same split as [`split_list`], each sub-list rendered as comma separated tokens.
///
/// An empty sub-list renders as `None`, never as an empty string: consumers
/// test the rendering to decide whether a worker has any work at all.
pub fn split_list_delimited<T: Clone + Display>(
    items: &[T],
    parallelism: usize,
    mode: SplitMode,
) -> Vec<Option<String>> {
    split_list(items, parallelism, mode)
        .iter()
        .map(|sub| to_delimited(sub))
        .collect()
}

pub fn to_delimited<T: Display>(items: &[T]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(","),
    )
}
