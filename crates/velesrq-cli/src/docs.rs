//! Feed document generation.
//!
//! Every vector read from the `.fvecs` file becomes one `put` or `update`
//! operation. All RQ fields receive the same packed record (codes followed by
//! metadata, as signed bytes); float fields receive the raw vector for
//! ground-truth comparisons.

use anyhow::Context;
use clap::{Args, ValueEnum};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::io::{Read, Write};
use std::path::PathBuf;
use velesrq_core::{FvecsReader, RqEncoder};

use crate::attributes::{filter_values, parse_field_names, parse_filters};
use crate::interval::Interval;

/// Feed operation emitted per vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedOp {
    /// Full document with synthetic attributes.
    Put,
    /// Partial update assigning the tensor fields only.
    Update,
}

/// Arguments of `velesrq docs`.
#[derive(Debug, Clone, Args)]
pub struct DocsArgs {
    /// Path to the .fvecs file
    pub vector_file: PathBuf,

    /// Feed operation type
    #[arg(long, value_enum, default_value_t = FeedOp::Put)]
    pub op: FeedOp,

    /// Document id of the first emitted document
    #[arg(long, default_value_t = 0)]
    pub begin_doc: u64,

    /// First vector index to read (inclusive)
    #[arg(long, default_value_t = 0)]
    pub start_vec: usize,

    /// Last vector index to read (exclusive)
    #[arg(long)]
    pub end_vec: usize,

    /// Comma-separated RQ tensor field names
    #[arg(long, default_value = "")]
    pub rq_fields: String,

    /// Comma-separated float tensor field names
    #[arg(long, default_value = "")]
    pub float_fields: String,

    /// Filter percentages, e.g. [10,50,90]
    #[arg(long, default_value = "")]
    pub filters: String,

    /// Latitude interval, e.g. [-90,90]
    #[arg(long)]
    pub latitude: Option<Interval>,

    /// Longitude interval, e.g. [-180,180]
    #[arg(long)]
    pub longitude: Option<Interval>,
}

/// Builds the external document id for `docid`.
#[must_use]
pub fn document_id(docid: u64) -> String {
    format!("id:test:test::{docid}")
}

/// Parsed, ready-to-use view of [`DocsArgs`].
struct DocLayout {
    rq_fields: Vec<String>,
    float_fields: Vec<String>,
    filters: Vec<u32>,
    latitude: Interval,
    longitude: Interval,
}

impl DocLayout {
    fn from_args(args: &DocsArgs) -> Self {
        Self {
            rq_fields: parse_field_names(&args.rq_fields),
            float_fields: parse_field_names(&args.float_fields),
            filters: parse_filters(&args.filters),
            latitude: args.latitude.unwrap_or_default(),
            longitude: args.longitude.unwrap_or_default(),
        }
    }

    fn has_location(&self) -> bool {
        !self.latitude.is_empty() && !self.longitude.is_empty()
    }

    fn put<R: Rng + ?Sized>(&self, docid: u64, encoded: &[i8], vector: &[f32], rng: &mut R) -> Value {
        let mut fields = Map::new();
        fields.insert("id".into(), json!(docid));

        if !self.filters.is_empty() {
            fields.insert("filter".into(), json!(filter_values(docid, &self.filters)));
        }
        if self.has_location() {
            let lat = self.latitude.sample(rng);
            let lng = self.longitude.sample(rng);
            fields.insert("latlng".into(), json!({ "lat": lat, "lng": lng }));
        }
        for name in &self.rq_fields {
            fields.insert(name.clone(), json!({ "values": encoded }));
        }
        for name in &self.float_fields {
            fields.insert(name.clone(), json!({ "values": vector }));
        }

        json!({ "put": document_id(docid), "fields": fields })
    }

    fn update(&self, docid: u64, encoded: &[i8], vector: &[f32]) -> Value {
        let mut fields = Map::new();
        for name in &self.rq_fields {
            fields.insert(name.clone(), json!({ "assign": { "values": encoded } }));
        }
        for name in &self.float_fields {
            fields.insert(name.clone(), json!({ "assign": { "values": vector } }));
        }

        json!({ "update": document_id(docid), "fields": fields })
    }
}

/// Writes the feed as a JSON array to `out` and returns the document count.
///
/// Stops early if the vector file ends before `end_vec`.
pub fn write_documents<S, R, W>(
    encoder: &RqEncoder,
    reader: &mut FvecsReader<S>,
    args: &DocsArgs,
    rng: &mut R,
    out: &mut W,
) -> anyhow::Result<usize>
where
    S: Read,
    R: Rng + ?Sized,
    W: Write,
{
    let layout = DocLayout::from_args(args);
    tracing::info!(
        dimension = encoder.dimension(),
        packed_size = encoder.encoded_size(),
        seed = encoder.seed(),
        rq_fields = layout.rq_fields.len(),
        float_fields = layout.float_fields.len(),
        skip_rotation = encoder.skip_rotation(),
        "generating RQ documents"
    );

    let skipped = reader.skip_vectors(args.start_vec)?;
    if skipped < args.start_vec {
        tracing::warn!(
            start_vec = args.start_vec,
            available = skipped,
            "vector file ended before start vector"
        );
    }

    out.write_all(b"[\n")?;
    let mut written = 0usize;

    for vec_num in args.start_vec..args.end_vec {
        let vector = match reader.next() {
            Some(vector) => vector.with_context(|| format!("reading vector {vec_num}"))?,
            None => break,
        };
        let encoded = encoder
            .encode_as_i8(&vector)
            .with_context(|| format!("encoding vector {vec_num}"))?;

        let docid = args
            .begin_doc
            .checked_add((vec_num - args.start_vec) as u64)
            .with_context(|| {
                format!(
                    "document id overflows u64 at vector {vec_num} (--begin-doc {})",
                    args.begin_doc
                )
            })?;
        let document = match args.op {
            FeedOp::Put => layout.put(docid, &encoded, &vector, rng),
            FeedOp::Update => layout.update(docid, &encoded, &vector),
        };

        if written > 0 {
            out.write_all(b",\n")?;
        }
        serde_json::to_writer_pretty(&mut *out, &document)?;
        written += 1;
    }

    out.write_all(b"\n]\n")?;
    tracing::info!(documents = written, "document generation finished");
    Ok(written)
}

#[cfg(test)]
#[path = "docs_tests.rs"]
mod tests;
