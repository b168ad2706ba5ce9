use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::crossmatch::issues::ParsingIssue;
use crate::graph::builder::GraphBuilder;
use crate::graph::model::CompatibilityGraph;

#[derive(Args)]
pub struct GraphArgs {
    /// Patient pool file (JSON)
    #[arg(required = true)]
    pub pool: PathBuf,

    /// Configuration file (JSON); defaults apply when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HLA nomenclature table for ambiguous-code expansion (JSON)
    #[arg(long)]
    pub nomenclature: Option<PathBuf>,
}

#[derive(Serialize)]
struct GraphReport<'a> {
    graph: &'a CompatibilityGraph,
    issues: &'a [ParsingIssue],
}

pub fn run(args: GraphArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let pool = super::load_pool(&args.pool)?;
    let config = super::load_config(args.config.as_deref())?;
    let nomenclature = super::load_nomenclature(args.nomenclature.as_deref())?;

    let (graph, issues) = GraphBuilder::new(&pool, &nomenclature, &config).build();

    if verbose {
        eprintln!(
            "Graph: {} pair vertices, {} viable edges",
            graph.pairs.len(),
            graph.edges.len()
        );
    }

    match format {
        OutputFormat::Json => {
            let report = GraphReport {
                graph: &graph,
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("Compatibility Graph");
            println!("{}", "=".repeat(60));
            for edge in &graph.edges {
                let origin = if edge.manual_override {
                    " (manual override)"
                } else {
                    ""
                };
                println!(
                    "  {} -> {}  score {:.1}{origin}",
                    edge.donor_id, edge.recipient_id, edge.score
                );
            }
            if !issues.is_empty() {
                println!("\nIssues:");
                for issue in &issues {
                    println!("  {issue}");
                }
            }
        }
    }

    Ok(())
}
