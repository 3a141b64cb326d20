//! Command line front end for sparqlens-core
//!
//! `main.rs` only parses arguments and installs logging; everything it runs
//! lives here so it can be tested without spawning the binary.

pub mod args;
pub mod output;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value as JsonValue};
use sparqlens_core::query::DEFAULT_QUERY;
use sparqlens_core::{
    BatchTableIndex, CityObjectIndex, DetailMap, DispatchOutcome, EndpointClient,
    EnrichmentOptions, GraphDocument, LensConfig, NamespaceRegistry, NodeSelection,
    ResponseProvider, SparqlResponse, ViewController, ViewData, ViewFormat, build_graph,
    parse_endpoint,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use args::Cli;

/// Log to stderr so stdout carries only the rendered view
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file, if any, and apply command line overrides
pub fn resolve_config(cli: &Cli) -> Result<LensConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => LensConfig::load(path)?,
        None => LensConfig::default(),
    };

    if let Some(endpoint) = cli.endpoint.as_ref() {
        config.endpoint = Some(endpoint.clone());
    }
    if cli.no_details {
        config.enrich_buildings = false;
    }
    if let Some(format) = cli.format.as_ref() {
        config.default_format = format.clone();
    }
    Ok(config)
}

fn resolve_query(cli: &Cli) -> Result<String> {
    if let Some(query) = cli.query.as_ref() {
        return Ok(query.clone());
    }
    if let Some(path) = cli.query_file.as_deref() {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read query file {}", path.display()));
    }
    Ok(DEFAULT_QUERY.to_string())
}

fn connect(config: &LensConfig) -> Result<EndpointClient> {
    let endpoint = config.endpoint.as_deref().ok_or_else(|| {
        anyhow!("missing SPARQL endpoint (use --endpoint, SPARQLENS_ENDPOINT or the config file)")
    })?;
    let endpoint = parse_endpoint(endpoint).context("invalid endpoint")?;
    EndpointClient::new(endpoint, config).context("failed to create endpoint client")
}

fn load_response(path: &Path) -> Result<SparqlResponse> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read results file {}", path.display()))?;
    SparqlResponse::from_json_str(&raw)
        .with_context(|| format!("failed to parse results file {}", path.display()))
}

fn load_batch_table(path: &Path) -> Result<BatchTableIndex<Map<String, JsonValue>>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch table {}", path.display()))?;
    let rows: Vec<Map<String, JsonValue>> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse batch table {}", path.display()))?;
    Ok(BatchTableIndex::from_rows(rows))
}

/// Run one invocation, returning what should be printed to stdout.
///
/// `None` means nothing was rendered, e.g. the format is not available.
pub async fn run(cli: &Cli) -> Result<Option<String>> {
    let config = resolve_config(cli)?;
    let mut format_tag = config.default_format.clone();

    let mut prefix = String::new();
    let (data, document) = if let Some(node_id) = cli.select.as_deref() {
        let selection = NodeSelection::from_node_id(node_id)
            .with_context(|| format!("cannot select node {node_id}"))?;
        let city_object = match cli.batch_table.as_deref() {
            Some(path) => {
                let found = load_batch_table(path)?.find_selected(&selection).cloned();
                if found.is_none() {
                    warn!(
                        key = selection.key,
                        id = %selection.companion_id,
                        "selected node not found in batch table"
                    );
                }
                found
            }
            None => None,
        };
        let mut provider = ResponseProvider::new(connect(&config)?, EnrichmentOptions::from(&config));
        let details = provider
            .query_key_value(&selection.detail_query)
            .await
            .context("node detail query failed")?;
        if !cli.raw {
            prefix = output::compose_selection(&selection, city_object.as_ref());
        }
        // a detail document has no graph to draw
        if cli.format.is_none() {
            format_tag = ViewFormat::Json.tag().to_string();
        }
        (ViewData::Json(JsonValue::Object(details)), None)
    } else if let Some(path) = cli.input.as_deref() {
        let response = load_response(path)?;
        let mut registry = NamespaceRegistry::new();
        let triples = response
            .triples()
            .with_context(|| format!("unusable results file {}", path.display()))?;
        let document = build_graph(&triples, &DetailMap::new(), &mut registry);
        (ViewData::Graph(document.clone()), Some(document))
    } else {
        let query = resolve_query(cli)?;
        let mut provider = ResponseProvider::new(connect(&config)?, EnrichmentOptions::from(&config));
        let document: GraphDocument = provider
            .query_graph(&query)
            .await
            .context("SPARQL query failed")?;
        (ViewData::Graph(document.clone()), Some(document))
    };

    let mut controller = ViewController::new();
    match controller.update_tag(&data, &format_tag) {
        DispatchOutcome::Rendered => {}
        DispatchOutcome::Unavailable(_) | DispatchOutcome::Unsupported(_) => {
            eprintln!("format `{format_tag}` not available");
            return Ok(None);
        }
        DispatchOutcome::Failed(err) => {
            return Err(anyhow!(err).context(format!("cannot render {format_tag} view")));
        }
    }

    let view = controller
        .take()
        .ok_or_else(|| anyhow!("view controller holds no view after rendering"))?;

    let rendered = if cli.raw {
        let mut content = view.content.clone();
        content.push('\n');
        content
    } else {
        format!("{prefix}{}", output::compose(&view, document.as_ref()))
    };

    if let Some(save_base) = cli.save.as_deref() {
        let output_path = output::build_output_path(save_base, view.format, cli.raw);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
        fs::write(&output_path, rendered.as_bytes())
            .with_context(|| format!("failed to write output file {}", output_path.display()))?;
        info!(path = %output_path.display(), "view saved");
        eprintln!("Wrote output to {}", output_path.display());
    }

    Ok(Some(rendered))
}
