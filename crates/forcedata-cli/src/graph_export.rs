//! Graph record exporters.
//!
//! Output formats:
//! - `js`: `var forceData = [...];`, loaded by the force-directed explorer page
//! - `json`: the bare record array (for custom frontends)
//! - `html`: self-contained explorer with the records embedded (works offline)

use anyhow::Result;
use clap::ValueEnum;
use forcedata_factory::GraphRecord;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Js,
    Json,
    #[value(alias = "htm")]
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub inherit_edges: usize,
    pub contain_edges: usize,
}

impl GraphSummary {
    pub fn of(records: &[GraphRecord]) -> Self {
        Self {
            nodes: records.len(),
            inherit_edges: records
                .iter()
                .filter(|r| r.inherit_data_id.is_some())
                .count(),
            contain_edges: records.iter().map(|r| r.properties.len()).sum(),
        }
    }

    pub fn edges(&self) -> usize {
        self.inherit_edges + self.contain_edges
    }
}

pub fn render(format: GraphFormat, records: &[GraphRecord]) -> Result<String> {
    match format {
        GraphFormat::Js => render_js(records),
        GraphFormat::Json => render_json(records),
        GraphFormat::Html => render_html(records),
    }
}

pub fn render_js(records: &[GraphRecord]) -> Result<String> {
    Ok(format!(
        "var forceData = {};\n",
        serde_json::to_string_pretty(records)?
    ))
}

/// The `usagetree` snippet (no trailing newline; the caller prints a line).
pub fn render_usages(records: &[GraphRecord]) -> Result<String> {
    Ok(format!(
        "var usages = {};",
        serde_json::to_string_pretty(records)?
    ))
}

pub fn render_json(records: &[GraphRecord]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}

pub fn render_html(records: &[GraphRecord]) -> Result<String> {
    // `</` is escaped so record ids can never close the <script> tag.
    let json = serde_json::to_string(records)?.replace("</", "<\\/");
    let summary = GraphSummary::of(records);

    let template = include_str!("../templates/force_graph.html");
    let mut html = template.to_string();
    html = html.replace("{{GRAPH_JSON}}", &json);
    html = html.replace("{{NODES_COUNT}}", &summary.nodes.to_string());
    html = html.replace("{{EDGES_COUNT}}", &summary.edges().to_string());
    Ok(html)
}

// =============================================================================
// Tests
// =============================================================================
