use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::crossmatch::issues::ParsingIssue;
use crate::graph::builder::GraphBuilder;
use crate::solver::engine::MatchingSolver;
use crate::solver::result::{ScoredMatching, SolveOutcome};

#[derive(Args)]
pub struct SolveArgs {
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
struct SolveReport<'a> {
    outcome: &'a SolveOutcome,
    issues: &'a [ParsingIssue],
}

pub fn run(args: SolveArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let pool = super::load_pool(&args.pool)?;
    let config = super::load_config(args.config.as_deref())?;
    let nomenclature = super::load_nomenclature(args.nomenclature.as_deref())?;

    if verbose {
        eprintln!(
            "Pool: {} donors, {} recipients, {} pairs",
            pool.donors.len(),
            pool.recipients.len(),
            pool.pairs.len()
        );
    }

    let (graph, issues) = GraphBuilder::new(&pool, &nomenclature, &config).build();
    if verbose {
        eprintln!("Graph: {} viable edges", graph.edges.len());
    }

    let outcome = MatchingSolver::new().solve(&graph, &config);

    match format {
        OutputFormat::Json => {
            let report = SolveReport {
                outcome: &outcome,
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(&outcome, &issues),
    }

    Ok(())
}

fn print_text(outcome: &SolveOutcome, issues: &[ParsingIssue]) {
    match outcome {
        SolveOutcome::Infeasible { reason } => {
            println!("No matching possible: {reason}");
        }
        SolveOutcome::Cancelled => {
            println!("Solve cancelled");
        }
        SolveOutcome::Feasible(result) => {
            println!("Matchings Found");
            println!("{}", "=".repeat(60));
            if !result.optimal {
                println!("(search budget exhausted: results not proven optimal)");
            }
            for (rank, scored) in result.matchings.iter().enumerate() {
                print_matching(rank + 1, scored);
            }
        }
    }

    if !issues.is_empty() {
        println!("\nData-quality issues ({}):", issues.len());
        for issue in issues {
            println!("  {issue}");
        }
    }
}

fn print_matching(rank: usize, scored: &ScoredMatching) {
    println!(
        "\n#{rank}  objective {}  ({} transplants, total score {:.1})",
        scored.objective,
        scored.matching.transplant_count(),
        scored.matching.total_score()
    );
    for round in &scored.matching.rounds {
        let kind = match round.kind {
            crate::solver::result::RoundKind::Cycle => "cycle",
            crate::solver::result::RoundKind::Chain => "chain",
        };
        let legs: Vec<String> = round
            .transplants
            .iter()
            .map(|t| format!("{} -> {} ({:.1})", t.donor_id, t.recipient_id, t.score))
            .collect();
        println!("  {kind}: {}", legs.join(", "));
    }
}
