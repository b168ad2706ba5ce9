use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::types::{DonorId, RecipientId};
use crate::crossmatch::issues::ParsingIssue;
use crate::crossmatch::resolver::{CrossmatchResolver, CrossmatchSummary};

#[derive(Args)]
pub struct CrossmatchArgs {
    /// Patient pool file (JSON)
    #[arg(required = true)]
    pub pool: PathBuf,

    /// Donor id to crossmatch
    #[arg(long)]
    pub donor: String,

    /// Recipient id to crossmatch against
    #[arg(long)]
    pub recipient: String,

    /// HLA nomenclature table for ambiguous-code expansion (JSON)
    #[arg(long)]
    pub nomenclature: Option<PathBuf>,
}

#[derive(Serialize)]
struct CrossmatchReport<'a> {
    donor: &'a str,
    recipient: &'a str,
    summaries: &'a [CrossmatchSummary],
    issues: &'a [ParsingIssue],
}

pub fn run(args: CrossmatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let pool = super::load_pool(&args.pool)?;
    let nomenclature = super::load_nomenclature(args.nomenclature.as_deref())?;

    let donor_id = DonorId::new(&args.donor);
    let recipient_id = RecipientId::new(&args.recipient);
    let donor = pool
        .donors
        .iter()
        .find(|d| d.id == donor_id)
        .ok_or_else(|| anyhow!("Donor '{}' not found in pool", args.donor))?;
    let recipient = pool
        .recipients
        .iter()
        .find(|r| r.id == recipient_id)
        .ok_or_else(|| anyhow!("Recipient '{}' not found in pool", args.recipient))?;

    if verbose {
        eprintln!(
            "Donor {}: {} antigens; recipient {}: {} antibodies",
            donor.id,
            donor.hla_typing.len(),
            recipient.id,
            recipient.antibodies.len()
        );
    }

    let resolver = CrossmatchResolver::new(&nomenclature);
    let (summaries, issues) = resolver.resolve(&donor.hla_typing, &recipient.antibodies);

    match format {
        OutputFormat::Json => {
            let report = CrossmatchReport {
                donor: &args.donor,
                recipient: &args.recipient,
                summaries: &summaries,
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(&args, &summaries, &issues),
    }

    Ok(())
}

fn print_text(args: &CrossmatchArgs, summaries: &[CrossmatchSummary], issues: &[ParsingIssue]) {
    println!("Virtual Crossmatch: {} -> {}", args.donor, args.recipient);
    println!("{}", "=".repeat(60));

    for summary in summaries {
        let verdict = if summary.is_positive_crossmatch {
            "POSITIVE"
        } else {
            "negative"
        };
        let mfi = summary
            .mfi
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        println!(
            "  {:<12} group {:<4} {verdict:<8} mfi {mfi}",
            summary.hla_code.display(),
            summary.group
        );
        for issue_kind in &summary.issues {
            println!("      note: {issue_kind}");
        }
    }

    if !issues.is_empty() {
        println!("\nIssues:");
        for issue in issues {
            println!("  {issue}");
        }
    }
}
