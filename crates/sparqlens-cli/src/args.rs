use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// sparqlens — A semantic lens for SPARQL endpoints
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sparqlens", version, about, long_about = None)]
pub struct Cli {
    /// SPARQL query text (defaults to the CityGML city object query)
    pub query: Option<String>,

    /// SPARQL endpoint URL
    #[arg(short, long, env = "SPARQLENS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Read the query from a file
    #[arg(short = 'q', long, value_name = "PATH", conflicts_with = "query")]
    pub query_file: Option<PathBuf>,

    /// Transform a stored SPARQL JSON results document instead of querying
    #[arg(
        short,
        long,
        value_name = "PATH",
        conflicts_with_all = ["query", "query_file", "select"]
    )]
    pub input: Option<PathBuf>,

    /// Result format: graph, json, table or timeline
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Do not fetch building details
    #[arg(long)]
    pub no_details: bool,

    /// Show the details of one graph node, as selected in the graph view
    #[arg(long, value_name = "NODE_ID")]
    pub select: Option<String>,

    /// JSON batch table (array of attribute objects) to look the selected node up in
    #[arg(long, value_name = "PATH", requires = "select")]
    pub batch_table: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write the rendered view to a file or directory
    #[arg(short, long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Print only the rendered view, without section headers
    #[arg(long)]
    pub raw: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
