//! Farcaster Resolver - resolve wallet addresses from the command line
//!
//! Resolves every address given as an argument (or one per line on stdin)
//! through a single batching resolver and prints a JSON object mapping each
//! input to its Farcaster identity, or `null`.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use clap::Parser;
use farcaster_resolver::{Config, NameResolver, ResolvedIdentity, Result};
use futures::future::join_all;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "farcaster-resolver", about = "Resolve wallet addresses to Farcaster identities")]
struct Args {
    /// Addresses to resolve; read from stdin when omitted
    addresses: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("farcaster_resolver=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    };

    let args = Args::parse();

    let config = Config::from_env();
    info!("Neynar API: {}", config.api_url);
    info!("Cache duration: {:?}", config.cache_duration);

    let addresses = if args.addresses.is_empty() {
        read_addresses(io::stdin().lock())?
    } else {
        args.addresses
    };

    let resolver = NameResolver::from_config(&config);
    let results = join_all(addresses.iter().map(|address| resolver.resolve(address))).await;

    let resolved: BTreeMap<&str, Option<ResolvedIdentity>> = addresses
        .iter()
        .map(String::as_str)
        .zip(results)
        .collect();

    let mut stdout = io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut stdout, &resolved)?;
    } else {
        serde_json::to_writer(&mut stdout, &resolved)?;
    }
    writeln!(stdout)?;

    let metadata = resolver.metadata().borrow().clone();
    info!(
        cache_size = metadata.cache_size,
        last_update = ?metadata.last_update,
        "Done"
    );

    Ok(())
}

/// One address per non-blank line
fn read_addresses(input: impl BufRead) -> Result<Vec<String>> {
    let mut addresses = Vec::new();
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            addresses.push(line.to_string());
        }
    }
    Ok(addresses)
}
