use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use decant::engine::MigrationEngine;
use decant::object_store::FsObjectStore;
use decant::{db, logging, MigrationReport, RunStatus};

#[derive(Parser)]
#[command(
    name = "decant",
    about = "Migrate catalog-indexed files from object storage onto a local data directory"
)]
struct Cli {
    /// Path to the metadata catalog (SQLite database)
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,

    /// Destination data directory; must exist and be empty
    #[arg(long, value_name = "PATH")]
    data_root: PathBuf,

    /// Directory holding the bucket's objects keyed as urn:oid:<id>
    #[arg(long, value_name = "PATH")]
    bucket: PathBuf,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Only check that the destination root is empty, then exit
    #[command(about, long_about = None)]
    Preflight,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(target: "decant", event = "run_fatal", error = %err);
            eprintln!("decant: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let pool = db::open_catalog_pool(&cli.catalog).await?;
    let store = FsObjectStore::new(&cli.bucket);
    let engine = MigrationEngine::new(&pool, &store, cli.data_root.clone());

    if let Some(Cmd::Preflight) = cli.cmd {
        let entries = engine.preflight()?;
        pool.close().await;
        if entries == 0 {
            println!("Destination {} is empty.", cli.data_root.display());
            return Ok(0);
        }
        println!(
            "Destination {} holds {entries} entries; refusing to migrate.",
            cli.data_root.display()
        );
        return Ok(2);
    }

    let report = engine.run().await?;
    pool.close().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(report.status.exit_code() as u8)
}

fn print_summary(report: &MigrationReport) {
    match &report.status {
        RunStatus::Complete => println!("Status: complete"),
        RunStatus::BlockedPreflight { entries } => {
            println!("Status: blocked (destination holds {entries} entries)")
        }
        RunStatus::BlockedTransfer { failures } => {
            println!("Status: blocked ({failures} transfer failures)")
        }
    }
    println!(
        "Structure: {} attempted, {} failed",
        report.outcome.structure.attempted, report.outcome.structure.failures
    );
    println!(
        "Transfer:  {} attempted, {} failed",
        report.outcome.transfer.attempted, report.outcome.transfer.failures
    );
    for item in report
        .outcome
        .structure
        .failed
        .iter()
        .chain(report.outcome.transfer.failed.iter())
    {
        println!("  failed: {item}");
    }
    if let Some(cutover) = &report.cutover {
        println!(
            "Cutover:   {} per-user rows, {} shared rows rewritten",
            cutover.per_user_rows, cutover.shared_rows
        );
    }
}
