//! Shared aggregates and errors for the Jenkinsfile audit.
//!
//! This crate provides the types passed between the scanner and the reporter:
//! - `AuditError` — error taxonomy (only file access and JSON output can fail)
//! - `PipelineStructure` — stage name to the directives found in its step block
//! - `Tally` — occurrence counter behind `DirectiveCounts` and `TriggerCounts`
//! - `Trigger` — the closed vocabulary of scheduling triggers
//! - `Aggregates` — the three outputs of one scan

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Unified error type for the audit.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to read pipeline file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias for `Result<T, AuditError>`.
pub type Result<T> = std::result::Result<T, AuditError>;

// ---------------------------------------------------------------------------
// Trigger — recognised scheduling keywords
// ---------------------------------------------------------------------------

/// Scheduling trigger keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trigger {
    #[serde(rename = "cron")]
    Cron,
    #[serde(rename = "pollSCM")]
    PollScm,
}

impl Trigger {
    pub const ALL: [Trigger; 2] = [Trigger::Cron, Trigger::PollScm];

    /// The keyword as written in a pipeline file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Cron => "cron",
            Trigger::PollScm => "pollSCM",
        }
    }

    /// Look up a trigger by its exact (case-sensitive) keyword.
    pub fn from_keyword(keyword: &str) -> Option<Trigger> {
        Trigger::ALL.into_iter().find(|t| t.as_str() == keyword)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tally — occurrence counter
// ---------------------------------------------------------------------------

/// Occurrence counts keyed by `K`. Missing keys read as zero.
///
/// Keys iterate in ascending order so two tallies built from the same input
/// are identical, including their iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally<K: Ord> {
    counts: BTreeMap<K, usize>,
}

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `key`.
    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Remove one occurrence of `key`, dropping the key when it reaches zero.
    pub fn decrement<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if let Some(count) = self.counts.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(key);
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }
}

/// Directive name to total occurrences across all stages.
pub type DirectiveCounts = Tally<String>;

/// Trigger keyword to occurrences anywhere in the file.
pub type TriggerCounts = Tally<Trigger>;

// ---------------------------------------------------------------------------
// PipelineStructure — stages and their directives
// ---------------------------------------------------------------------------

/// One stage and the directives recorded under it, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSteps {
    pub name: String,
    pub directives: Vec<String>,
}

/// Stage name to its directive sequence.
///
/// Stage names are unique keys kept in first-seen order. Opening a stage that
/// already exists empties its sequence but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<StageSteps>", from = "Vec<StageSteps>")]
pub struct PipelineStructure {
    stages: Vec<StageSteps>,
    /// Stage name to its position in `stages`.
    index: HashMap<String, usize>,
}

impl PipelineStructure {
    pub fn new() -> Self {
        Self::default()
    }

    fn position_or_insert(&mut self, name: &str) -> usize {
        if let Some(&pos) = self.index.get(name) {
            return pos;
        }
        let pos = self.stages.len();
        self.stages.push(StageSteps {
            name: name.to_string(),
            directives: Vec::new(),
        });
        self.index.insert(name.to_string(), pos);
        pos
    }

    /// Start (or restart) the sequence for `name`.
    ///
    /// Returns the directives discarded from an earlier stage of the same name.
    pub fn open_stage(&mut self, name: &str) -> Vec<String> {
        let pos = self.position_or_insert(name);
        std::mem::take(&mut self.stages[pos].directives)
    }

    /// Append `directive` to the sequence of `stage`, creating the stage if needed.
    pub fn record(&mut self, stage: &str, directive: &str) {
        let pos = self.position_or_insert(stage);
        self.stages[pos].directives.push(directive.to_string());
    }

    pub fn get(&self, stage: &str) -> Option<&[String]> {
        self.index
            .get(stage)
            .map(|&pos| self.stages[pos].directives.as_slice())
    }

    /// Number of distinct stage names.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageSteps> {
        self.stages.iter()
    }

    /// Sum of the sequence lengths over all stages.
    pub fn total_directives(&self) -> usize {
        self.stages.iter().map(|s| s.directives.len()).sum()
    }
}

impl From<Vec<StageSteps>> for PipelineStructure {
    /// Later entries with a repeated name replace the earlier contents in place.
    fn from(stages: Vec<StageSteps>) -> Self {
        let mut structure = PipelineStructure::new();
        for stage in stages {
            let pos = structure.position_or_insert(&stage.name);
            structure.stages[pos].directives = stage.directives;
        }
        structure
    }
}

impl From<PipelineStructure> for Vec<StageSteps> {
    fn from(structure: PipelineStructure) -> Self {
        structure.stages
    }
}

// ---------------------------------------------------------------------------
// Aggregates — output of one scan
// ---------------------------------------------------------------------------

/// The three aggregates produced by a single scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub structure: PipelineStructure,
    pub directives: DirectiveCounts,
    pub triggers: TriggerCounts,
}

impl Aggregates {
    /// `true` when the directive counts add up to the recorded stage sequences.
    pub fn is_consistent(&self) -> bool {
        self.directives.total() == self.structure.total_directives()
    }
}
