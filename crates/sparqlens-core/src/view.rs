//! View selection: pick one renderer for a result and keep what is displayed

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::ViewError;
use crate::render::{self, LegendEntry};
use crate::types::GraphDocument;

/// Result formats offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    Graph,
    Json,
    Table,
    /// Offered but not implemented
    Timeline,
}

impl ViewFormat {
    pub const ALL: [ViewFormat; 4] = [
        ViewFormat::Graph,
        ViewFormat::Json,
        ViewFormat::Table,
        ViewFormat::Timeline,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ViewFormat::Graph => "graph",
            ViewFormat::Json => "json",
            ViewFormat::Table => "table",
            ViewFormat::Timeline => "timeline",
        }
    }

    pub fn is_available(self) -> bool {
        !matches!(self, ViewFormat::Timeline)
    }
}

impl fmt::Display for ViewFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown result format `{}`", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for ViewFormat {
    type Err = UnknownFormat;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ViewFormat::ALL
            .into_iter()
            .find(|format| format.tag().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| UnknownFormat(tag.to_string()))
    }
}

/// What a renderer is given
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Graph(GraphDocument),
    /// Raw JSON, e.g. a flattened key/value document
    Json(JsonValue),
}

impl From<GraphDocument> for ViewData {
    fn from(document: GraphDocument) -> Self {
        ViewData::Graph(document)
    }
}

impl From<JsonValue> for ViewData {
    fn from(value: JsonValue) -> Self {
        ViewData::Json(value)
    }
}

/// A rendered artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub format: ViewFormat,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Rendered,
    /// The format exists but has no renderer
    Unavailable(ViewFormat),
    /// The tag names no known format
    Unsupported(String),
    /// The renderer rejected the data
    Failed(ViewError),
}

impl DispatchOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, DispatchOutcome::Rendered)
    }
}

/// Render `data` in `format` without touching any displayed state
pub fn render(data: &ViewData, format: ViewFormat) -> Option<Result<RenderedView, ViewError>> {
    let rendered = match (format, data) {
        (ViewFormat::Graph, ViewData::Graph(document)) => Ok(RenderedView {
            format,
            content: render::graph_to_mermaid(document),
            legend: render::graph_legend(document),
        }),
        (ViewFormat::Graph, ViewData::Json(_)) => Err(ViewError::NeedsGraph { format: "graph" }),
        (ViewFormat::Json, ViewData::Graph(document)) => {
            render::to_pretty_json(document).map(|content| plain(format, content))
        }
        (ViewFormat::Json, ViewData::Json(value)) => {
            render::to_pretty_json(value).map(|content| plain(format, content))
        }
        (ViewFormat::Table, ViewData::Graph(document)) => {
            Ok(plain(format, render::graph_to_table(document)))
        }
        (ViewFormat::Table, ViewData::Json(value)) => {
            Ok(plain(format, render::json_to_table(value)))
        }
        (ViewFormat::Timeline, _) => return None,
    };
    Some(rendered)
}

fn plain(format: ViewFormat, content: String) -> RenderedView {
    RenderedView {
        format,
        content,
        legend: Vec::new(),
    }
}

/// Holds the currently displayed view. Each update replaces it outright;
/// any update that does not render leaves it as it was.
#[derive(Debug, Default)]
pub struct ViewController {
    current: Option<RenderedView>,
    renders: usize,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &ViewData, format: ViewFormat) -> DispatchOutcome {
        match render(data, format) {
            Some(Ok(view)) => {
                debug!(format = %format, bytes = view.content.len(), "view rendered");
                self.current = Some(view);
                self.renders += 1;
                DispatchOutcome::Rendered
            }
            Some(Err(err)) => {
                warn!(format = %format, error = %err, "render failed, keeping previous view");
                DispatchOutcome::Failed(err)
            }
            None => {
                warn!(format = %format, "format not available");
                DispatchOutcome::Unavailable(format)
            }
        }
    }

    /// Dispatch on a raw format tag as it comes from the user
    pub fn update_tag(&mut self, data: &ViewData, tag: &str) -> DispatchOutcome {
        match tag.parse::<ViewFormat>() {
            Ok(format) => self.update(data, format),
            Err(UnknownFormat(tag)) => {
                warn!(tag = %tag, "format not available");
                DispatchOutcome::Unsupported(tag)
            }
        }
    }

    pub fn current(&self) -> Option<&RenderedView> {
        self.current.as_ref()
    }

    pub fn take(&mut self) -> Option<RenderedView> {
        self.current.take()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphNode;

    fn document() -> ViewData {
        ViewData::Graph(GraphDocument {
            nodes: vec![
                GraphNode {
                    id: "ns#A".to_string(),
                    namespace: 0,
                },
                GraphNode {
                    id: "ns#B".to_string(),
                    namespace: 0,
                },
            ],
            links: vec![crate::types::GraphLink {
                source: "ns#A".to_string(),
                target: "ns#B".to_string(),
                label: "ns#rel".to_string(),
            }],
            legend: vec!["ns#".to_string()],
        })
    }

    #[test]
    fn parses_format_tags() {
        assert_eq!("graph".parse::<ViewFormat>(), Ok(ViewFormat::Graph));
        assert_eq!(" JSON ".parse::<ViewFormat>(), Ok(ViewFormat::Json));
        assert_eq!("table".parse::<ViewFormat>(), Ok(ViewFormat::Table));
        assert_eq!("timeline".parse::<ViewFormat>(), Ok(ViewFormat::Timeline));
        assert_eq!(
            "chart".parse::<ViewFormat>(),
            Err(UnknownFormat("chart".to_string()))
        );
    }

    #[test]
    fn tags_round_trip_through_display() {
        for format in ViewFormat::ALL {
            assert_eq!(format.to_string().parse::<ViewFormat>(), Ok(format));
        }
    }

    #[test]
    fn graph_view_renders_mermaid_and_legend() {
        let mut controller = ViewController::new();
        assert!(controller.update(&document(), ViewFormat::Graph).is_rendered());

        let view = controller.current().unwrap();
        assert_eq!(view.format, ViewFormat::Graph);
        assert!(view.content.contains("N0 -->|rel| N1"));
        assert_eq!(view.legend[0].label, "ns#");
    }

    #[test]
    fn json_view_is_pretty_printed() {
        let mut controller = ViewController::new();
        controller.update(&document(), ViewFormat::Json);
        let content = &controller.current().unwrap().content;
        let parsed: JsonValue = serde_json::from_str(content).unwrap();
        assert_eq!(parsed["nodes"][0]["id"], "ns#A");
        assert_eq!(parsed["nodes"][0]["namespace"], 0);
        assert_eq!(parsed["legend"][0], "ns#");
        assert!(content.contains('\n'));
    }

    #[test]
    fn timeline_leaves_view_untouched() {
        let mut controller = ViewController::new();
        controller.update(&document(), ViewFormat::Table);
        let before = controller.current().cloned();

        let outcome = controller.update(&document(), ViewFormat::Timeline);
        assert!(matches!(
            outcome,
            DispatchOutcome::Unavailable(ViewFormat::Timeline)
        ));
        assert_eq!(controller.current().cloned(), before);
        assert_eq!(controller.render_count(), 1);
    }

    #[test]
    fn unknown_tag_is_a_no_op() {
        let mut controller = ViewController::new();
        let outcome = controller.update_tag(&document(), "scatter");
        assert!(matches!(outcome, DispatchOutcome::Unsupported(tag) if tag == "scatter"));
        assert!(controller.current().is_none());
    }

    #[test]
    fn last_write_wins() {
        let mut controller = ViewController::new();
        controller.update_tag(&document(), "graph");
        controller.update_tag(&document(), "table");
        assert_eq!(controller.current().unwrap().format, ViewFormat::Table);
        assert_eq!(controller.render_count(), 2);
    }

    #[test]
    fn graph_view_needs_a_graph_document() {
        let mut controller = ViewController::new();
        controller.update(&document(), ViewFormat::Json);

        let raw = ViewData::Json(serde_json::json!({"prefLabel": "Mairie"}));
        let outcome = controller.update(&raw, ViewFormat::Graph);
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(ViewError::NeedsGraph { .. })
        ));
        assert_eq!(controller.current().unwrap().format, ViewFormat::Json);

        assert!(controller.update(&raw, ViewFormat::Table).is_rendered());
        assert!(controller.current().unwrap().content.contains("Mairie"));
    }
}
