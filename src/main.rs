use clap::Parser;
use std::collections::BTreeSet;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use macro_balancer_rs::balancer::balance_request;
use macro_balancer_rs::cli::{Cli, Command};
use macro_balancer_rs::error::Result;
use macro_balancer_rs::interface::{display_classification, display_report};
use macro_balancer_rs::models::BalanceOptions;
use macro_balancer_rs::state::{
    bulk_update_pairs, load_catalog, load_request, save_response, write_updates_csv, FileCatalog,
    FoodSource, ResolvedFood,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let overrides = cli.command.overrides();

    match cli.command {
        Command::Balance {
            request,
            catalog,
            out,
            updates,
            ..
        } => cmd_balance(&request, &catalog, &overrides, out.as_deref(), updates.as_deref()),
        Command::Classify { catalog, ids } => cmd_classify(&catalog, &ids),
    }
}

/// Balance a request file against a catalog file.
fn cmd_balance(
    request_path: &str,
    catalog_path: &str,
    overrides: &BalanceOptions,
    out: Option<&str>,
    updates: Option<&str>,
) -> Result<()> {
    let request = load_request(request_path)?;
    let source = FileCatalog::new(catalog_path);

    let report = balance_request(&request, &source, overrides)?;
    let response = report.to_response();

    match out {
        Some(path) => {
            save_response(path, &response)?;
            display_report(&report);
            println!("Response written to {}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    if let Some(path) = updates {
        let balanced: Vec<_> = report.all_ingredients().cloned().collect();
        let rows = bulk_update_pairs(&balanced);
        write_updates_csv(path, &rows)?;
        eprintln!("{} update rows written to {}", rows.len(), path);
    }

    Ok(())
}

/// Show how catalog foods are grouped.
fn cmd_classify(catalog_path: &str, ids: &[i64]) -> Result<()> {
    let path = Path::new(catalog_path);

    if !path.exists() {
        eprintln!("Catalog file not found: {}", catalog_path);
        return Ok(());
    }

    let catalog = load_catalog(path)?;
    let wanted: BTreeSet<i64> = if ids.is_empty() {
        catalog.all_foods().iter().map(|f| f.id).collect()
    } else {
        ids.iter().copied().collect()
    };

    let context = catalog.lookup(&wanted)?;
    let foods: Vec<ResolvedFood> = wanted
        .iter()
        .filter_map(|id| context.get(*id).cloned())
        .collect();

    display_classification(&foods);
    Ok(())
}
