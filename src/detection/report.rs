// Decision Rendering
use super::types::*;
use super::Analysis;
use crate::error::Result;
use comfy_table::{presets::ASCII_FULL, Table};
use serde::Serialize;

pub const DEADLOCK_DETECTED: &str = "Deadlock Detected";
pub const NO_DEADLOCK_DETECTED: &str = "No Deadlock Detected";
pub const SYSTEM_IN_DEADLOCK: &str = "System is in Deadlock";
pub const SYSTEM_IN_SAFE_STATE: &str = "System is in Safe State";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Append the cycle found by the graph search.
    pub show_cycle: bool,
    /// Append the Max/Allocation/Need table for Banker's results.
    pub show_table: bool,
}

/// The headline decision string for `analysis`.
pub fn decision_line(analysis: &Analysis) -> &'static str {
    match analysis {
        Analysis::Rag { cycle: Some(_), .. } => DEADLOCK_DETECTED,
        Analysis::Rag { cycle: None, .. } => NO_DEADLOCK_DETECTED,
        Analysis::Banker {
            outcome: SafetyOutcome::Deadlock,
            ..
        } => SYSTEM_IN_DEADLOCK,
        Analysis::Banker {
            outcome: SafetyOutcome::Safe(_),
            ..
        } => SYSTEM_IN_SAFE_STATE,
    }
}

pub fn render_text(analysis: &Analysis, options: &RenderOptions) -> String {
    let mut lines = vec![decision_line(analysis).to_string()];

    match analysis {
        Analysis::Rag { cycle, .. } => {
            if let (true, Some(cycle)) = (options.show_cycle, cycle) {
                lines.push(format!("Cycle: {}", format_cycle(cycle)));
            }
        }
        Analysis::Banker { state, outcome } => {
            if let SafetyOutcome::Safe(sequence) = outcome {
                lines.push(format!("Safe Sequence: {}", sequence));
            }
            if options.show_table {
                lines.push(render_table(state));
            }
        }
    }

    lines.join("\n")
}

/// `A -> B -> C -> A`
pub fn format_cycle(cycle: &[NodeId]) -> String {
    let mut nodes: Vec<&str> = cycle.iter().map(|n| n.as_str()).collect();
    if let Some(first) = cycle.first() {
        nodes.push(first);
    }
    nodes.join(" -> ")
}

fn resource_label(j: usize) -> String {
    if j < 26 {
        char::from(b'A' + j as u8).to_string()
    } else {
        format!("R{}", j)
    }
}

/// Per-process Max, Allocation and Need columns followed by the Available row.
pub fn render_table(state: &ResourceState) -> String {
    let m = state.resources();
    let labels: Vec<String> = (0..m).map(resource_label).collect();

    let mut header = vec!["Process".to_string()];
    for group in ["Max", "Alloc", "Need"] {
        header.extend(labels.iter().map(|l| format!("{} {}", group, l)));
    }

    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(header);

    for i in 0..state.processes() {
        let mut row = vec![format!("P{}", i)];
        for matrix in [state.maximum(), state.allocation(), state.need()] {
            row.extend(matrix[i].iter().map(|v| v.to_string()));
        }
        table.add_row(row);
    }

    let mut available_row = vec!["Available".to_string()];
    available_row.extend(std::iter::repeat(String::new()).take(2 * m));
    available_row.extend(state.available().iter().map(|v| v.to_string()));
    table.add_row(available_row);

    table.to_string()
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    mode: Mode,
    deadlock: bool,
    decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    safe_sequence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle: Option<&'a [NodeId]>,
}

pub fn render_json(analysis: &Analysis) -> Result<String> {
    let report = JsonReport {
        mode: analysis.mode(),
        deadlock: analysis.is_deadlocked(),
        decision: decision_line(analysis),
        safe_sequence: match analysis {
            Analysis::Banker { outcome, .. } => outcome.sequence().map(|s| s.labels()),
            Analysis::Rag { .. } => None,
        },
        cycle: match analysis {
            Analysis::Rag { cycle, .. } => cycle.as_deref(),
            Analysis::Banker { .. } => None,
        },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
