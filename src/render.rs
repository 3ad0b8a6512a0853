//! Terminal output for the spotlight view, batch reports and dim regions.

use std::fmt::Write as _;

use clap::ValueEnum;
use color_eyre::eyre::Result;
use serde::Serialize;

use spotlight_engine::{BatchReport, Hierarchy, LineRange, SpotlightNode};

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render the two-level tree as indented text.
pub fn tree_text(hierarchy: &Hierarchy) -> String {
    if hierarchy.is_empty() {
        return " Nothing spotlighted.\n".to_string();
    }

    let mut out = String::new();
    for folder in hierarchy.root_nodes() {
        let _ = writeln!(out, " {}/", folder.label());
        for file in hierarchy.children(&folder) {
            if let SpotlightNode::File { name, .. } = &file {
                let _ = writeln!(out, "   {name}");
            }
        }
    }
    out
}

/// One-line summary of a toggle batch.
pub fn report_text(report: &BatchReport) -> String {
    let mut line = format!(
        " {} target(s): +{} -{}",
        report.targets, report.added, report.removed
    );
    if report.has_warnings() {
        let _ = write!(line, ", {} skipped", report.warnings.len());
    }
    line
}

/// Dim regions as `start:col-end:col` per line.
pub fn regions_text(regions: &[LineRange]) -> String {
    if regions.is_empty() {
        return " No text dimmed.\n".to_string();
    }

    regions
        .iter()
        .map(|r| {
            format!(
                " dim {}:{}-{}:{}\n",
                r.start_line, r.start_col, r.end_line, r.end_col
            )
        })
        .collect()
}

/// Print `value` as pretty JSON or as the given text.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
