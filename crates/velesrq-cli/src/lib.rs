//! # `VelesRQ` CLI
//!
//! Turns `.fvecs` embeddings into RQ-encoded feed documents and ANN search
//! queries for benchmarking a search engine's rotated-quantization tensors.
//!
//! ```text
//! velesrq --dimension 128 docs base.fvecs --end-vec 1000 --rq-fields vec_rq
//! velesrq --dimension 128 queries query.fvecs --num-queries 100 \
//!     --doc-tensor vec_rq --query-tensor q_rq
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )
)]

pub mod attributes;
pub mod docs;
pub mod interval;
pub mod queries;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use velesrq_core::{EncoderConfig, RqEncoder};

use crate::docs::DocsArgs;
use crate::queries::QueryArgs;

/// VelesRQ - rotated 8-bit quantization feed and query generator
#[derive(Parser, Debug)]
#[command(name = "velesrq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with encoder settings
    #[arg(short, long, global = true, env = "VELESRQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vector dimension (overrides the config file)
    #[arg(short, long, global = true)]
    pub dimension: Option<usize>,

    /// Rotation seed, must match between documents and queries
    #[arg(short, long, global = true)]
    pub seed: Option<u64>,

    /// Quantize without rotating
    #[arg(long, global = true)]
    pub no_rotation: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate feed documents as a JSON array
    Docs(DocsArgs),
    /// Generate search queries, one per line
    Queries(QueryArgs),
}

impl Cli {
    /// Loads the layered encoder configuration and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read or the result is invalid.
    pub fn encoder_config(&self) -> anyhow::Result<EncoderConfig> {
        let mut config =
            EncoderConfig::load(self.config.as_deref()).context("loading encoder configuration")?;

        if let Some(dimension) = self.dimension {
            config.dimension = dimension;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_rotation {
            config.skip_rotation = true;
        }

        config
            .validate()
            .context("invalid encoder configuration (set --dimension or `dimension` in the config file)")?;
        Ok(config)
    }

    /// Builds the encoder shared by both subcommands.
    ///
    /// # Errors
    ///
    /// See [`Self::encoder_config`].
    pub fn encoder(&self) -> anyhow::Result<RqEncoder> {
        let config = self.encoder_config()?;
        Ok(RqEncoder::from_config(&config)?)
    }
}
