//! Frequency ranking.

use std::fmt::Display;

use serde::Serialize;

use jenkaudit_types::Tally;

/// One ranked entry: display name and occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub count: usize,
}

/// Order a tally by descending count; equal counts fall back to ascending
/// name order.
pub fn rank<K: Ord + Display>(tally: &Tally<K>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = tally
        .iter()
        .map(|(key, count)| RankedEntry {
            name: key.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries
}
