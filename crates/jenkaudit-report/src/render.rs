//! Audit summary rendering.
//!
//! Every renderer is a pure function of the aggregates and the supplied
//! timestamp; nothing here reads the clock.

use chrono::NaiveDateTime;
use serde::Serialize;

use jenkaudit_types::{Aggregates, PipelineStructure};

use crate::rank::{rank, RankedEntry};

const TITLE: &str = "Audit Summary";
const DIVIDER_WIDTH: usize = 20;
const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M";

/// Render the fixed-layout text report.
pub fn render(aggregates: &Aggregates, now: NaiveDateTime) -> String {
    let mut out = format!("{}\n{}\n", TITLE, "-".repeat(DIVIDER_WIDTH));
    out.push_str(&format!("Performed at : {}\n\n", now.format(TIMESTAMP_FORMAT)));

    out.push_str(&format!(
        "Pipelines\nTotal : {}\n\n",
        aggregates.structure.len()
    ));

    out.push_str(&format!(
        "Build Steps\nTotal : {}\n",
        aggregates.directives.total()
    ));
    push_entries(&mut out, &rank(&aggregates.directives));

    out.push_str(&format!(
        "\nTriggers\nTotal : {}\n",
        aggregates.triggers.total()
    ));
    push_entries(&mut out, &rank(&aggregates.triggers));

    out
}

fn push_entries(out: &mut String, entries: &[RankedEntry]) {
    for entry in entries {
        out.push_str(&format!("-> {} : {}\n", entry.name, entry.count));
    }
}

/// Render each stage with its directives in source order.
pub fn render_stages(structure: &PipelineStructure) -> String {
    if structure.is_empty() {
        return "No stages found\n".to_string();
    }

    let mut out = String::new();
    for stage in structure.iter() {
        out.push_str(&format!("{} ({})\n", stage.name, stage.directives.len()));
        for directive in &stage.directives {
            out.push_str(&format!("  {}\n", directive));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    performed_at: String,
    pipelines: usize,
    build_steps: JsonSection,
    triggers: JsonSection,
    stages: &'a PipelineStructure,
}

#[derive(Debug, Serialize)]
struct JsonSection {
    total: usize,
    ranking: Vec<RankedEntry>,
}

/// Render the same summary as pretty-printed JSON, with the per-stage structure attached.
pub fn render_json(aggregates: &Aggregates, now: NaiveDateTime) -> jenkaudit_types::Result<String> {
    let summary = JsonSummary {
        performed_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        pipelines: aggregates.structure.len(),
        build_steps: JsonSection {
            total: aggregates.directives.total(),
            ranking: rank(&aggregates.directives),
        },
        triggers: JsonSection {
            total: aggregates.triggers.total(),
            ranking: rank(&aggregates.triggers),
        },
        stages: &aggregates.structure,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}
