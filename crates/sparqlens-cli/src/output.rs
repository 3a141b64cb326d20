use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use sparqlens_core::render::LegendEntry;
use sparqlens_core::{GraphDocument, NodeSelection, RenderedView, ViewFormat};

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;

pub fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

pub fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

/// Wrap a rendered view in section headers, with a summary of the document
pub fn compose(view: &RenderedView, document: Option<&GraphDocument>) -> String {
    let mut output = String::new();

    if let Some(document) = document {
        push_section_header(&mut output, "📊", "Result Summary");
        push_key_value(&mut output, "Nodes", &document.nodes.len().to_string());
        push_key_value(&mut output, "Links", &document.links.len().to_string());
        push_key_value(&mut output, "Namespaces", &document.legend.len().to_string());
        let _ = writeln!(output);
    }

    match view.format {
        ViewFormat::Graph => {
            push_section_header(&mut output, "🕸️", "Graph View");
            output.push_str("```mermaid\n");
            output.push_str(&view.content);
            output.push_str("\n```\n");
            render_legend(&mut output, &view.legend);
        }
        ViewFormat::Json => {
            push_section_header(&mut output, "🧾", "JSON View");
            output.push_str("```json\n");
            output.push_str(&view.content);
            output.push_str("\n```\n");
        }
        ViewFormat::Table => {
            push_section_header(&mut output, "📋", "Table View");
            output.push_str(&view.content);
        }
        // never rendered
        ViewFormat::Timeline => {}
    }

    output
}

fn render_legend(buf: &mut String, entries: &[LegendEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(buf);
    push_section_header(buf, "🎨", "Legend");
    for entry in entries {
        let _ = writeln!(buf, "• {} {}", entry.color, entry.label);
    }
}

/// Selected node header, followed by its batch table row when one was found
pub fn compose_selection(
    selection: &NodeSelection,
    city_object: Option<&Map<String, JsonValue>>,
) -> String {
    let mut output = String::new();
    push_section_header(&mut output, "📍", "Selected Node");
    push_key_value(&mut output, "Node", &selection.node_id);
    push_key_value(&mut output, "City object key", selection.key);
    push_key_value(&mut output, "City object id", &selection.companion_id);
    let _ = writeln!(output);

    if let Some(attributes) = city_object {
        push_section_header(&mut output, "🏙️", "City Object");
        for (key, value) in attributes {
            let value = match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            push_key_value(&mut output, key, &value);
        }
        let _ = writeln!(output);
    }
    output
}

/// A path with an extension is used as-is; anything else is a directory
pub fn build_output_path(base: &Path, format: ViewFormat, raw: bool) -> PathBuf {
    if base.extension().is_some() {
        base.to_path_buf()
    } else {
        base.join(derive_output_filename(format, raw))
    }
}

fn derive_output_filename(format: ViewFormat, raw: bool) -> String {
    let extension = match (format, raw) {
        (ViewFormat::Json, true) => "json",
        (ViewFormat::Graph, true) => "mmd",
        _ => "md",
    };
    format!("sparqlens-{}.{extension}", format.tag())
}
