//! Text renderers for the graph, JSON and table views

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::ViewError;
use crate::types::GraphDocument;
use crate::uri::local_id;

/// The category10 color scheme, indexed by namespace
pub const NAMESPACE_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Node ids containing one of these are shared reference data, drawn black
pub const COMMON_DATA_MARKERS: [&str; 3] = ["2017", "inconnu", "EPSG"];
const COMMON_DATA_COLOR: &str = "#000000";

/// Predicate fragments with a dedicated link color
pub const LINK_CATEGORIES: [(&str, &str); 6] = [
    ("prefLabel", "#0d5e08"),
    ("consistsOfBuildingPart", "#a6ec08"),
    ("creationDate", "#ff0000"),
    ("coordinateDimension", "#976b00"),
    ("altLabel", "#9700b9"),
    ("cityObjectMember", "#52eb08"),
];
const DEFAULT_LINK_COLOR: &str = "#976bb9";

/// One row of the color key shown alongside a rendered graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

pub fn namespace_color(index: usize) -> &'static str {
    NAMESPACE_PALETTE[index % NAMESPACE_PALETTE.len()]
}

pub fn is_common_data(node_id: &str) -> bool {
    COMMON_DATA_MARKERS
        .iter()
        .any(|marker| node_id.contains(marker))
}

pub fn link_color(label: &str) -> &'static str {
    LINK_CATEGORIES
        .iter()
        .find(|(fragment, _)| label.contains(fragment))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_LINK_COLOR)
}

/// Render a graph document as a Mermaid flowchart
pub fn graph_to_mermaid(document: &GraphDocument) -> String {
    if document.nodes.is_empty() {
        return "graph LR\n  Empty[\"No data\"]".to_string();
    }

    let mut lines = Vec::new();
    lines.push("graph LR".to_string());

    let mut id_map = HashMap::new();
    for (idx, node) in document.nodes.iter().enumerate() {
        let mermaid_id = format!("N{idx}");
        id_map.insert(node.id.as_str(), mermaid_id.clone());
        lines.push(format!(
            "  {mermaid_id}[\"{}\"]",
            escape_mermaid_label(&node_label(&node.id))
        ));
    }

    let mut link_styles = Vec::new();
    for link in &document.links {
        // links to unknown nodes are not drawn
        let (Some(from), Some(to)) = (
            id_map.get(link.source.as_str()),
            id_map.get(link.target.as_str()),
        ) else {
            continue;
        };
        lines.push(format!(
            "  {from} -->|{pred}| {to}",
            pred = escape_edge_label(&node_label(&link.label))
        ));
        link_styles.push(link_color(&link.label));
    }

    let mut used_classes = Vec::new();
    for (idx, node) in document.nodes.iter().enumerate() {
        let class = if is_common_data(&node.id) {
            "common".to_string()
        } else {
            format!("ns{}", node.namespace % NAMESPACE_PALETTE.len())
        };
        if !used_classes.contains(&class) {
            used_classes.push(class.clone());
        }
        lines.push(format!("  class N{idx} {class}"));
    }

    for class in &used_classes {
        let fill = match class.strip_prefix("ns") {
            Some(index) => index
                .parse::<usize>()
                .map(namespace_color)
                .unwrap_or(DEFAULT_LINK_COLOR),
            None => COMMON_DATA_COLOR,
        };
        lines.push(format!(
            "  classDef {class} fill:{fill},stroke:#333,stroke-width:1.5px,color:#fff"
        ));
    }

    for (idx, color) in link_styles.iter().enumerate() {
        lines.push(format!("  linkStyle {idx} stroke:{color},stroke-opacity:0.6"));
    }

    lines.join("\n")
}

/// Color key: one entry per namespace, then shared data, then link categories
pub fn graph_legend(document: &GraphDocument) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = document
        .legend
        .iter()
        .enumerate()
        .map(|(idx, namespace)| LegendEntry {
            color: namespace_color(idx).to_string(),
            label: if namespace.is_empty() {
                "(no namespace)".to_string()
            } else {
                namespace.clone()
            },
        })
        .collect();

    if document.nodes.iter().any(|node| is_common_data(&node.id)) {
        entries.push(LegendEntry {
            color: COMMON_DATA_COLOR.to_string(),
            label: "Common data".to_string(),
        });
    }

    for (fragment, color) in LINK_CATEGORIES {
        if document.links.iter().any(|link| link.label.contains(fragment)) {
            entries.push(LegendEntry {
                color: color.to_string(),
                label: fragment.to_string(),
            });
        }
    }

    entries
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ViewError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Nodes as an `id | namespace` table
pub fn graph_to_table(document: &GraphDocument) -> String {
    let rows: Vec<Vec<String>> = document
        .nodes
        .iter()
        .map(|node| vec![node.id.clone(), node.namespace.to_string()])
        .collect();
    render_table(&["id", "namespace"], &rows)
}

/// A JSON object as a `key | value` table; other values become one row
pub fn json_to_table(value: &JsonValue) -> String {
    let rows: Vec<Vec<String>> = match value {
        JsonValue::Object(map) => map
            .iter()
            .map(|(key, value)| vec![key.clone(), json_value_display(value)])
            .collect(),
        JsonValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, value)| vec![idx.to_string(), json_value_display(value)])
            .collect(),
        other => vec![vec![String::new(), json_value_display(other)]],
    };
    render_table(&["key", "value"], &rows)
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut buf = String::new();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| escape_table_cell(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        let mut parts = Vec::with_capacity(cells.len());
        for (idx, cell) in cells.iter().enumerate() {
            parts.push(format!(" {:<width$} ", cell, width = widths[idx]));
        }
        format!("|{}|", parts.join("|"))
    };

    let header_cells = headers.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let _ = writeln!(buf, "{}", format_row(&header_cells));

    let mut separator_parts = Vec::new();
    for width in &widths {
        separator_parts.push(format!(" {:-<width$} ", "", width = *width));
    }
    let _ = writeln!(buf, "|{}|", separator_parts.join("|"));

    for row in &rows {
        let _ = writeln!(buf, "{}", format_row(row));
    }

    buf
}

fn node_label(id: &str) -> String {
    match local_id(id) {
        "" => id.to_string(),
        local => local.to_string(),
    }
}

fn json_value_display(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn escape_mermaid_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

/// `|` delimits edge labels
fn escape_edge_label(label: &str) -> String {
    escape_mermaid_label(label).replace('|', "#124;")
}

fn escape_table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
