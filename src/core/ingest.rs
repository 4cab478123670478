use crate::core::{ParsedUpload, Record, Storage};
use crate::utils::error::Result;
use csv::{ByteRecord, ReaderBuilder};
use std::collections::HashSet;

/// Upper bound on records kept from one upload.
pub const MAX_RECORDS: usize = 500;

/// Parses a header-first CSV document into records.
///
/// Rows whose cells are all empty are dropped. Everything past
/// [`MAX_RECORDS`] is counted but not decoded. Repeated header names get
/// `_1`, `_2`, ... suffixes. A document the reader cannot make sense of
/// yields an empty upload instead of an error; validation reports the
/// missing columns later.
pub fn parse_csv_bytes(bytes: &[u8]) -> ParsedUpload {
    match try_parse(bytes, MAX_RECORDS) {
        Ok(parsed) => {
            if parsed.discarded_rows > 0 {
                tracing::debug!(
                    "✂️ Kept first {} rows, discarded {}",
                    parsed.records.len(),
                    parsed.discarded_rows
                );
            }
            parsed
        }
        Err(e) => {
            tracing::warn!("⚠️ Could not parse uploaded CSV, continuing with no rows: {}", e);
            ParsedUpload::empty()
        }
    }
}

fn try_parse(bytes: &[u8], limit: usize) -> Result<ParsedUpload> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    // Invalid UTF-8 becomes U+FFFD; it never fails the document.
    let raw_headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let header = String::from_utf8_lossy(h);
            if i == 0 {
                header.trim_start_matches('\u{feff}').to_string()
            } else {
                header.into_owned()
            }
        })
        .collect();
    let headers = dedupe_headers(raw_headers);

    let mut records = Vec::new();
    let mut discarded_rows = 0usize;
    let mut row = ByteRecord::new();

    while reader.read_byte_record(&mut row)? {
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        // Past the cap rows are only counted, never decoded.
        if records.len() >= limit {
            discarded_rows += 1;
            continue;
        }
        records.push(to_record(&headers, &row));
    }

    Ok(ParsedUpload {
        headers,
        records,
        discarded_rows,
    })
}

/// Renames repeated header names to `name_1`, `name_2`, ... so no column
/// shadows another.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        let mut suffix = 0;
        while seen.contains(&name) {
            suffix += 1;
            name = format!("{}_{}", header, suffix);
        }
        if name != header {
            tracing::warn!("⚠️ Duplicate column '{}' renamed to '{}'", header, name);
        }
        seen.insert(name.clone());
        result.push(name);
    }
    result
}

// Short rows only get the cells they have; cells past the header are ignored.
fn to_record(headers: &[String], row: &ByteRecord) -> Record {
    Record::from_pairs(
        headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| (h.clone(), String::from_utf8_lossy(cell).into_owned())),
    )
}

/// Reads `path` through `storage` and parses it.
pub async fn parse_file<S: Storage>(storage: &S, path: &str) -> Result<ParsedUpload> {
    tracing::debug!("📂 Reading upload from {}", path);
    let bytes = storage.read_file(path).await?;
    Ok(parse_csv_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_with_rows(n: usize) -> String {
        let mut text = String::from("review_text,brand,product_id\n");
        for i in 1..=n {
            text.push_str(&format!("review {},Acme,P{}\n", i, i));
        }
        text
    }

    #[test]
    fn test_parse_keys_rows_by_header() {
        let parsed = parse_csv_bytes(b"review_text,brand,product_id\ngood,Acme,P1\nbad,Nimbus,P2\n");

        assert_eq!(parsed.headers, vec!["review_text", "brand", "product_id"]);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.records[0].get("review_text"), Some("good"));
        assert_eq!(parsed.records[1].get("brand"), Some("Nimbus"));
        assert_eq!(parsed.discarded_rows, 0);
    }

    #[test]
    fn test_parse_drops_blank_rows() {
        let parsed = parse_csv_bytes(b"review_text,brand\ngood,Acme\n\n,\nok,Vertex\n\n\n");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.records[1].get("review_text"), Some("ok"));
    }

    #[test]
    fn test_parse_truncates_to_prefix() {
        let text = csv_with_rows(600);
        let parsed = parse_csv_bytes(text.as_bytes());

        assert_eq!(parsed.len(), MAX_RECORDS);
        assert_eq!(parsed.discarded_rows, 100);
        assert_eq!(parsed.records[0].get("review_text"), Some("review 1"));
        assert_eq!(parsed.records[499].get("review_text"), Some("review 500"));
        assert!(parsed
            .records
            .iter()
            .all(|r| r.get("review_text") != Some("review 501")));
    }

    #[test]
    fn test_parse_exactly_at_cap_keeps_everything() {
        let parsed = parse_csv_bytes(csv_with_rows(500).as_bytes());
        assert_eq!(parsed.len(), 500);
        assert_eq!(parsed.discarded_rows, 0);
    }

    #[test]
    fn test_parse_latin1_bytes_keep_their_rows() {
        let parsed = parse_csv_bytes(b"review_text,brand,product_id\ncaf\xe9 ok,Acme,P1\n");

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.records[0].get("review_text"), Some("caf\u{fffd} ok"));
        assert_eq!(parsed.records[0].get("brand"), Some("Acme"));
    }

    #[test]
    fn test_parse_bad_bytes_past_cap_do_not_affect_kept_rows() {
        let mut bytes = csv_with_rows(500).into_bytes();
        bytes.extend_from_slice(b"caf\xe9,Acme,P501\n");

        let parsed = parse_csv_bytes(&bytes);
        assert_eq!(parsed.len(), MAX_RECORDS);
        assert_eq!(parsed.discarded_rows, 1);
        assert_eq!(parsed.records[499].get("review_text"), Some("review 500"));
    }

    #[test]
    fn test_parse_renames_duplicate_headers() {
        let parsed = parse_csv_bytes(b"review_text,brand,brand,brand\ngood,Acme,Nimbus,Vertex\n");

        assert_eq!(parsed.headers, vec!["review_text", "brand", "brand_1", "brand_2"]);
        let record = &parsed.records[0];
        assert_eq!(record.get("brand"), Some("Acme"));
        assert_eq!(record.get("brand_1"), Some("Nimbus"));
        assert_eq!(record.get("brand_2"), Some("Vertex"));
    }

    #[test]
    fn test_dedupe_skips_names_already_taken() {
        let headers = dedupe_headers(vec!["a".into(), "a_1".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "a_1", "a_2"]);
    }

    #[test]
    fn test_parse_short_rows_and_quoted_cells() {
        let parsed = parse_csv_bytes(
            "\u{feff}review_text,brand,product_name\n\"great, really\",Acme\n".as_bytes(),
        );

        assert_eq!(parsed.headers[0], "review_text");
        let record = &parsed.records[0];
        assert_eq!(record.get("review_text"), Some("great, really"));
        assert_eq!(record.get("brand"), Some("Acme"));
        assert!(!record.contains_column("product_name"));
    }

    #[test]
    fn test_parse_empty_document() {
        let parsed = parse_csv_bytes(b"");
        assert!(parsed.is_empty());
        assert!(parsed.headers.is_empty());
    }
}
