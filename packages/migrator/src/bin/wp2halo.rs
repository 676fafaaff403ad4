//! Migrate exported WordPress posts, images and categories into Halo.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wp2halo::sources::{load_categories, OutputDirectory};
use wp2halo::{
    CategoryOutcome, Config, FilenameMatching, HaloTarget, MigrationOptions,
    MigrationOrchestrator, MigrationReport,
};

#[derive(Parser)]
#[command(name = "wp2halo")]
#[command(about = "Import exported WordPress posts and categories into Halo")]
struct Cli {
    /// WordPress export file the categories are read from [env: WP2HALO_INPUT]
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory holding the exported markdown posts [env: WP2HALO_OUTPUT]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Posts are `<slug>.md` files sharing one images directory
    #[arg(long)]
    flat: bool,

    /// How image filenames are matched in post content
    #[arg(long, value_parser = parse_matching)]
    filename_matching: Option<FilenameMatching>,

    /// Only report what would be migrated
    #[arg(long)]
    dry_run: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_matching(s: &str) -> std::result::Result<FilenameMatching, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wp2halo=debug,halo_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", "Something went wrong, execution halted early.".red().bold());
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(input) = cli.input {
        config.input = input;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.flat {
        config.post_folders = false;
    }
    if let Some(matching) = cli.filename_matching {
        config.filename_matching = matching;
    }
    tracing::info!(?config, "Configuration loaded");

    let posts = OutputDirectory::new(&config.output, config.post_folders).load_posts()?;
    let categories = load_categories(&config.input)?;

    let target = HaloTarget::new(&config.halo)?;
    let options = MigrationOptions {
        filename_matching: config.filename_matching,
        dry_run: cli.dry_run,
    };
    let orchestrator = MigrationOrchestrator::new(target, options);

    let report = orchestrator.run(posts, &categories).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &MigrationReport) {
    println!();
    println!("{}", "All done!".bright_green().bold());
    println!("  {} {}", "imported:".green(), report.succeeded);
    println!("  {} {}", "failed:".red(), report.failed);
    println!("  {} {}", "skipped:".blue(), report.skipped);
    if report.would_migrate > 0 {
        println!("  {} {}", "would migrate:".cyan(), report.would_migrate);
    }
    if report.update_failures > 0 {
        println!(
            "  {} {}",
            "imported but not updated:".yellow(),
            report.update_failures
        );
    }

    match report.categories {
        Some(CategoryOutcome::Updated { matched, total }) => {
            println!("  {} {}/{} matched", "categories:".green(), matched, total)
        }
        Some(CategoryOutcome::BatchFailed { matched, total }) => println!(
            "  {} batch update failed ({}/{} matched)",
            "categories:".red(),
            matched,
            total
        ),
        Some(CategoryOutcome::NotSubmitted { matched, total }) => println!(
            "  {} not submitted ({}/{} matched)",
            "categories:".cyan(),
            matched,
            total
        ),
        None => {}
    }
}
