use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::io::Cursor;
use velesrq_core::fvecs::write_fvecs_record;

const DIM: usize = 8;

fn fvecs_bytes(count: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for i in 0..count {
        let vector: Vec<f32> = (0..DIM).map(|j| (i * DIM + j) as f32 * 0.5 - 3.0).collect();
        write_fvecs_record(&mut bytes, &vector).unwrap();
    }
    bytes
}

fn args(op: FeedOp) -> DocsArgs {
    DocsArgs {
        vector_file: PathBuf::from("unused.fvecs"),
        op,
        begin_doc: 0,
        start_vec: 0,
        end_vec: 3,
        rq_fields: "vec_rq".into(),
        float_fields: String::new(),
        filters: String::new(),
        latitude: None,
        longitude: None,
    }
}

fn generate(args: &DocsArgs, vectors: usize) -> (usize, Value) {
    let encoder = RqEncoder::new(DIM, 42).unwrap();
    let mut reader = FvecsReader::new(Cursor::new(fvecs_bytes(vectors)), DIM);
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = Vec::new();
    let count = write_documents(&encoder, &mut reader, args, &mut rng, &mut out).unwrap();
    (count, serde_json::from_slice(&out).unwrap())
}

#[test]
fn test_document_id() {
    assert_eq!(document_id(17), "id:test:test::17");
}

#[test]
fn test_put_documents_carry_packed_records() {
    let (count, json) = generate(&args(FeedOp::Put), 5);
    assert_eq!(count, 3);

    let docs = json.as_array().unwrap();
    assert_eq!(docs.len(), 3);
    for (i, doc) in docs.iter().enumerate() {
        assert_eq!(doc["put"], format!("id:test:test::{i}"));
        assert_eq!(doc["fields"]["id"], i as u64);
        let values = doc["fields"]["vec_rq"]["values"].as_array().unwrap();
        assert_eq!(values.len(), DIM + 16);
        assert!(values
            .iter()
            .all(|v| (-128..=127).contains(&v.as_i64().unwrap())));
        assert!(doc["fields"].get("filter").is_none());
        assert!(doc["fields"].get("latlng").is_none());
    }
}

#[test]
fn test_field_order_follows_feed_layout() {
    let mut args = args(FeedOp::Put);
    args.float_fields = "vec_float".into();
    args.filters = "[10,50]".into();
    args.latitude = Some(Interval::new(-90.0, 90.0));
    args.longitude = Some(Interval::new(-180.0, 180.0));

    let (_, json) = generate(&args, 3);
    let keys: Vec<&str> = json[0]["fields"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["id", "filter", "latlng", "vec_rq", "vec_float"]);
}

#[test]
fn test_begin_doc_offsets_ids_and_start_vec_skips() {
    let mut args = args(FeedOp::Put);
    args.begin_doc = 100;
    args.start_vec = 2;
    args.end_vec = 4;

    let (count, json) = generate(&args, 6);
    assert_eq!(count, 2);
    assert_eq!(json[0]["put"], "id:test:test::100");
    assert_eq!(json[1]["put"], "id:test:test::101");

    let encoder = RqEncoder::new(DIM, 42).unwrap();
    let third: Vec<f32> = (0..DIM).map(|j| (2 * DIM + j) as f32 * 0.5 - 3.0).collect();
    let expected = encoder.encode_as_i8(&third).unwrap();
    let actual: Vec<i8> = json[0]["fields"]["vec_rq"]["values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap() as i8)
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_stops_at_end_of_file() {
    let mut args = args(FeedOp::Put);
    args.end_vec = 10;
    let (count, json) = generate(&args, 4);
    assert_eq!(count, 4);
    assert_eq!(json.as_array().unwrap().len(), 4);
}

#[test]
fn test_empty_range_is_empty_array() {
    let mut args = args(FeedOp::Put);
    args.end_vec = 0;
    let (count, json) = generate(&args, 4);
    assert_eq!(count, 0);
    assert!(json.as_array().unwrap().is_empty());
}

#[test]
fn test_filter_values_follow_docid() {
    let mut args = args(FeedOp::Put);
    args.filters = "[1,2]".into();
    let (_, json) = generate(&args, 3);
    assert_eq!(json[0]["fields"]["filter"], serde_json::json!([]));
    assert_eq!(json[1]["fields"]["filter"], serde_json::json!([1]));
    assert_eq!(json[2]["fields"]["filter"], serde_json::json!([1, 2]));
}

#[test]
fn test_latlng_sampled_within_intervals() {
    let mut args = args(FeedOp::Put);
    args.latitude = Some(Interval::new(10.0, 20.0));
    args.longitude = Some(Interval::new(-5.0, 5.0));
    let (_, json) = generate(&args, 3);

    for doc in json.as_array().unwrap() {
        let lat = doc["fields"]["latlng"]["lat"].as_f64().unwrap();
        let lng = doc["fields"]["latlng"]["lng"].as_f64().unwrap();
        assert!((10.0..=20.0).contains(&lat));
        assert!((-5.0..=5.0).contains(&lng));
    }
}

#[test]
fn test_latlng_omitted_when_one_interval_empty() {
    let mut args = args(FeedOp::Put);
    args.latitude = Some(Interval::new(10.0, 20.0));
    let (_, json) = generate(&args, 1);
    assert!(json[0]["fields"].get("latlng").is_none());
}

#[test]
fn test_update_documents_assign_tensors_only() {
    let mut args = args(FeedOp::Update);
    args.float_fields = "vec_float".into();
    args.filters = "[10]".into();

    let (_, json) = generate(&args, 3);
    let doc = &json[1];
    assert_eq!(doc["update"], "id:test:test::1");
    assert!(doc.get("put").is_none());

    let fields = doc["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(
        fields["vec_rq"]["assign"]["values"].as_array().unwrap().len(),
        DIM + 16
    );
    assert_eq!(
        fields["vec_float"]["assign"]["values"].as_array().unwrap().len(),
        DIM
    );
}

#[test]
fn test_dimension_mismatch_is_reported() {
    let encoder = RqEncoder::new(DIM, 42).unwrap();
    let mut bytes = Vec::new();
    write_fvecs_record(&mut bytes, &[1.0; 4]).unwrap();
    let mut reader = FvecsReader::new(Cursor::new(bytes), DIM);
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = Vec::new();

    let err = write_documents(&encoder, &mut reader, &args(FeedOp::Put), &mut rng, &mut out)
        .unwrap_err();
    assert!(format!("{err:#}").contains("reading vector 0"));
}

#[test]
fn test_document_id_overflow_is_error() {
    let mut args = args(FeedOp::Put);
    args.begin_doc = u64::MAX;
    args.end_vec = 2;

    let encoder = RqEncoder::new(DIM, 42).unwrap();
    let mut reader = FvecsReader::new(Cursor::new(fvecs_bytes(2)), DIM);
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = Vec::new();

    let err = write_documents(&encoder, &mut reader, &args, &mut rng, &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("overflows"));
}

#[test]
fn test_last_representable_document_id() {
    let mut args = args(FeedOp::Put);
    args.begin_doc = u64::MAX;
    args.end_vec = 1;

    let (count, json) = generate(&args, 1);
    assert_eq!(count, 1);
    assert_eq!(json[0]["put"], format!("id:test:test::{}", u64::MAX));
}
