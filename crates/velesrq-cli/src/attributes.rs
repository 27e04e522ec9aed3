//! Parsing of field lists and synthetic filter attributes.

/// Splits a comma-separated list of field names, dropping empty entries.
#[must_use]
pub fn parse_field_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parses filter percentages written as `[10,50,90]` or `{10,50,90}`.
///
/// Parsing stops at the first entry that is not an integer.
#[must_use]
pub fn parse_filters(list: &str) -> Vec<u32> {
    list.trim()
        .trim_start_matches(['[', '{'])
        .trim_end_matches([']', '}'])
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .take_while(Result::is_ok)
        .flatten()
        .collect()
}

/// Filter percentages a document carries: every `p` with `docid % 100 >= p`.
///
/// A query filtering on `p` therefore matches roughly `(100 - p)%` of documents.
#[must_use]
pub fn filter_values(docid: u64, filters: &[u32]) -> Vec<u32> {
    let bucket = docid % 100;
    filters
        .iter()
        .copied()
        .filter(|&percent| bucket >= u64::from(percent))
        .collect()
}
