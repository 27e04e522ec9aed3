//! ANN query generation.
//!
//! In `full` mode each query vector becomes one URL-encoded YQL search line
//! with the RQ-encoded query attached as a ranking feature. The other modes
//! print the bare tensors, one bracketed list per line.

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use rand::Rng;
use std::fmt::{Display, Write as _};
use std::io::{Read, Write};
use std::path::PathBuf;
use velesrq_core::{FvecsReader, RqEncoder};

use crate::interval::Interval;

const SEARCH_PREFIX: &str = "/search/?yql=select%20*%20from%20sources%20*%20where%20";
const QUOTE: &str = "%22";

/// Output format of `velesrq queries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryMode {
    /// Complete search URLs.
    Full,
    /// RQ-encoded query tensors only.
    RqVectors,
    /// Raw float query tensors only.
    FloatVectors,
}

/// Arguments of `velesrq queries`.
#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    /// Path to the .fvecs query file
    pub vector_file: PathBuf,

    /// Number of queries to generate
    #[arg(long)]
    pub num_queries: usize,

    /// Document tensor field used in nearestNeighbor
    #[arg(long)]
    pub doc_tensor: Option<String>,

    /// Query tensor name used in nearestNeighbor and the ranking feature
    #[arg(long)]
    pub query_tensor: Option<String>,

    /// Use approximate (HNSW) search
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub approximate: bool,

    /// targetNumHits annotation
    #[arg(long, default_value_t = 100)]
    pub target_hits: u32,

    /// hnsw.exploreAdditionalHits annotation
    #[arg(long, default_value_t = 0)]
    pub explore_hits: u32,

    /// Filter percentage (0 disables the filter clause)
    #[arg(long, default_value_t = 0)]
    pub filter_percent: u32,

    /// Geo radius in km (0 disables the geoLocation clause)
    #[arg(long, default_value_t = 0.0)]
    pub radius: f32,

    /// Latitude interval for query points, e.g. [-90,90]
    #[arg(long)]
    pub latitude: Option<Interval>,

    /// Longitude interval for query points, e.g. [-180,180]
    #[arg(long)]
    pub longitude: Option<Interval>,

    /// Output format
    #[arg(long, value_enum, default_value_t = QueryMode::Full)]
    pub mode: QueryMode,
}

/// Formats `values` as `[v0,v1,...]` with no spaces.
#[must_use]
pub fn format_list<T: Display>(values: &[T]) -> String {
    let mut out = String::with_capacity(values.len() * 4 + 2);
    out.push('[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Reason: writing to a String cannot fail
        let _ = write!(out, "{value}");
    }
    out.push(']');
    out
}

/// Field and tensor names used in `full` mode.
struct QueryTarget<'a> {
    doc_tensor: &'a str,
    query_tensor: &'a str,
}

impl QueryArgs {
    fn target(&self) -> anyhow::Result<QueryTarget<'_>> {
        match (self.doc_tensor.as_deref(), self.query_tensor.as_deref()) {
            (Some(doc_tensor), Some(query_tensor)) => Ok(QueryTarget {
                doc_tensor,
                query_tensor,
            }),
            _ => bail!("--doc-tensor and --query-tensor are required in full mode"),
        }
    }

    fn geo_intervals(&self) -> Option<(Interval, Interval)> {
        let latitude = self.latitude.unwrap_or_default();
        let longitude = self.longitude.unwrap_or_default();
        (self.radius > 0.0 && !latitude.is_empty() && !longitude.is_empty())
            .then_some((latitude, longitude))
    }

    /// `[{annotations}]nearestNeighbor(doc,query)`, URL-encoded.
    fn nearest_neighbor_clause(&self, target: &QueryTarget<'_>) -> String {
        format!(
            "[%7B{QUOTE}targetNumHits{QUOTE}:{},{QUOTE}hnsw.exploreAdditionalHits{QUOTE}:{},\
             {QUOTE}approximate{QUOTE}:{},{QUOTE}label{QUOTE}:{QUOTE}nns{QUOTE}%7D]\
             nearestNeighbor({},{})",
            self.target_hits,
            self.explore_hits,
            self.approximate,
            target.doc_tensor,
            target.query_tensor
        )
    }
}

/// Builds one complete search line for an encoded query.
fn search_line<R: Rng + ?Sized>(
    args: &QueryArgs,
    target: &QueryTarget<'_>,
    encoded: &[i8],
    rng: &mut R,
) -> String {
    let mut line = String::from(SEARCH_PREFIX);
    line.push_str(&args.nearest_neighbor_clause(target));

    if args.filter_percent > 0 {
        let _ = write!(line, "%20and%20filter%3D{}", args.filter_percent);
    }
    if let Some((latitude, longitude)) = args.geo_intervals() {
        let lat = latitude.sample(rng);
        let lng = longitude.sample(rng);
        let _ = write!(
            line,
            "%20and%20geoLocation(latlng,{lat},{lng},{QUOTE}{}+km{QUOTE})",
            args.radius
        );
    }

    let _ = write!(
        line,
        ";&ranking.features.query({})={}",
        target.query_tensor,
        format_list(encoded)
    );
    line
}

/// Writes `num_queries` lines to `out` and returns how many were written.
///
/// Stops early if the vector file runs out.
pub fn write_queries<S, R, W>(
    encoder: &RqEncoder,
    reader: &mut FvecsReader<S>,
    args: &QueryArgs,
    rng: &mut R,
    out: &mut W,
) -> anyhow::Result<usize>
where
    S: Read,
    R: Rng + ?Sized,
    W: Write,
{
    let target = match args.mode {
        QueryMode::Full => Some(args.target()?),
        QueryMode::RqVectors | QueryMode::FloatVectors => None,
    };
    tracing::info!(
        mode = ?args.mode,
        num_queries = args.num_queries,
        dimension = encoder.dimension(),
        seed = encoder.seed(),
        "generating queries"
    );

    let mut written = 0usize;
    for query_num in 0..args.num_queries {
        let vector = match reader.next() {
            Some(vector) => vector.with_context(|| format!("reading query {query_num}"))?,
            None => {
                tracing::warn!(requested = args.num_queries, written, "query file exhausted");
                break;
            }
        };

        let line = if args.mode == QueryMode::FloatVectors {
            format_list(&vector)
        } else {
            let encoded = encoder
                .encode_as_i8(&vector)
                .with_context(|| format!("encoding query {query_num}"))?;
            match &target {
                Some(target) => search_line(args, target, &encoded, rng),
                None => format_list(&encoded),
            }
        };

        writeln!(out, "{line}")?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
#[path = "queries_tests.rs"]
mod tests;
