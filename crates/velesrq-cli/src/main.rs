//! `velesrq` binary entry point.

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use velesrq_cli::{docs, queries, Cli, Command};
use velesrq_core::FvecsReader;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the generated feed
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let encoder = cli.encoder()?;
    let mut rng = StdRng::seed_from_u64(encoder.seed());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &cli.command {
        Command::Docs(args) => {
            let mut reader = FvecsReader::open(&args.vector_file, encoder.dimension())
                .with_context(|| format!("opening {}", args.vector_file.display()))?;
            docs::write_documents(&encoder, &mut reader, args, &mut rng, &mut out)?;
        }
        Command::Queries(args) => {
            let mut reader = FvecsReader::open(&args.vector_file, encoder.dimension())
                .with_context(|| format!("opening {}", args.vector_file.display()))?;
            queries::write_queries(&encoder, &mut reader, args, &mut rng, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
