use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod crossmatch;
mod graph;
mod scoring;
mod solver;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("kpd_solver=debug,info")
    } else {
        EnvFilter::new("kpd_solver=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Solve(args) => {
            cli::solve::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Crossmatch(args) => {
            cli::crossmatch::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Graph(args) => {
            cli::graph::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
