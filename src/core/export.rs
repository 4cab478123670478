use crate::core::Storage;
use crate::domain::sentiment::{ClassifiedRecord, SentimentLabel};
use crate::utils::error::{ClientError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const RESULTS_CSV: &str = "batch_results.csv";
pub const RESULTS_ZIP: &str = "batch_results.zip";
pub const SUMMARY_JSON: &str = "summary.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportSummary {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub average_confidence: f64,
}

impl ExportSummary {
    pub fn from_rows(rows: &[ClassifiedRecord]) -> Self {
        let mut summary = ExportSummary {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.label {
                SentimentLabel::Positive => summary.positive += 1,
                SentimentLabel::Neutral => summary.neutral += 1,
                SentimentLabel::Negative => summary.negative += 1,
            }
        }
        if !rows.is_empty() {
            summary.average_confidence =
                rows.iter().map(|r| r.confidence).sum::<f64>() / rows.len() as f64;
        }
        summary
    }
}

/// Column order for exported results: upload headers first, then any extra
/// columns the service returned, then the verdict.
pub fn result_columns(headers: &[String], rows: &[ClassifiedRecord]) -> Vec<String> {
    let is_verdict = |c: &str| c == "label" || c == "confidence";

    let mut columns: Vec<String> = Vec::new();
    for header in headers {
        if !is_verdict(header) && !columns.contains(header) {
            columns.push(header.clone());
        }
    }
    for row in rows {
        for key in row.fields.keys() {
            if !is_verdict(key) && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns.push("label".to_string());
    columns.push("confidence".to_string());
    columns
}

pub fn results_to_csv(headers: &[String], rows: &[ClassifiedRecord]) -> Result<String> {
    let columns = result_columns(headers, rows);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| row.cell(c)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ClientError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ClientError::ValidationError {
        message: format!("exported CSV is not UTF-8: {}", e),
    })
}

/// Writes classified rows to storage as CSV, or as a ZIP with a JSON summary.
pub struct ResultExporter<S: Storage> {
    storage: S,
    output_path: String,
    zip_output: bool,
}

impl<S: Storage> ResultExporter<S> {
    pub fn new(storage: S, output_path: impl Into<String>, zip_output: bool) -> Self {
        Self {
            storage,
            output_path: output_path.into(),
            zip_output,
        }
    }

    pub async fn export(&self, headers: &[String], rows: &[ClassifiedRecord]) -> Result<String> {
        let csv_output = results_to_csv(headers, rows)?;

        let file_name = if self.zip_output {
            let summary = ExportSummary::from_rows(rows);
            let archive = build_archive(&csv_output, &summary)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", archive.len());
            self.storage.write_file(RESULTS_ZIP, &archive).await?;
            RESULTS_ZIP
        } else {
            self.storage
                .write_file(RESULTS_CSV, csv_output.as_bytes())
                .await?;
            RESULTS_CSV
        };

        Ok(format!("{}/{}", self.output_path, file_name))
    }
}

fn build_archive(csv_output: &str, summary: &ExportSummary) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file(RESULTS_CSV, SimpleFileOptions::default())?;
    zip.write_all(csv_output.as_bytes())?;

    zip.start_file(SUMMARY_JSON, SimpleFileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ClientError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn classified(review: &str, label: &str, confidence: f64) -> ClassifiedRecord {
        serde_json::from_value(serde_json::json!({
            "review_text": review,
            "brand": "Acme",
            "product_id": "P1",
            "label": label,
            "confidence": confidence
        }))
        .unwrap()
    }

    fn headers() -> Vec<String> {
        vec!["review_text".into(), "brand".into(), "product_id".into()]
    }

    #[test]
    fn test_csv_keeps_upload_order_and_appends_verdict() {
        let rows = vec![
            classified("great, really", "Positive", 0.9),
            classified("awful", "negative", 0.75),
        ];

        let csv_output = results_to_csv(&headers(), &rows).unwrap();
        let lines: Vec<&str> = csv_output.lines().collect();

        assert_eq!(lines[0], "review_text,brand,product_id,label,confidence");
        assert_eq!(lines[1], "\"great, really\",Acme,P1,Positive,0.9");
        assert_eq!(lines[2], "awful,Acme,P1,Negative,0.75");
    }

    #[test]
    fn test_extra_service_columns_are_kept() {
        let mut row = classified("ok", "Neutral", 0.6);
        row.fields
            .insert("lang".to_string(), serde_json::Value::String("en".to_string()));

        let columns = result_columns(&headers(), &[row]);
        assert_eq!(
            columns,
            vec!["review_text", "brand", "product_id", "lang", "label", "confidence"]
        );
    }

    #[test]
    fn test_summary_counts_labels() {
        let rows = vec![
            classified("a", "Positive", 1.0),
            classified("b", "Positive", 0.5),
            classified("c", "Negative", 0.6),
        ];
        let summary = ExportSummary::from_rows(&rows);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.neutral, 0);
        assert_eq!(summary.negative, 1);
        assert!((summary.average_confidence - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_export_plain_csv() {
        let storage = MockStorage::default();
        let exporter = ResultExporter::new(storage.clone(), "out", false);

        let path = exporter
            .export(&headers(), &[classified("good", "Positive", 0.8)])
            .await
            .unwrap();

        assert_eq!(path, "out/batch_results.csv");
        let files = storage.files.lock().await;
        let written = String::from_utf8(files.get(RESULTS_CSV).unwrap().clone()).unwrap();
        assert!(written.starts_with("review_text,brand,product_id,label,confidence"));
    }

    #[tokio::test]
    async fn test_export_zip_bundle() {
        let storage = MockStorage::default();
        let exporter = ResultExporter::new(storage.clone(), "out", true);

        let path = exporter
            .export(&headers(), &[classified("good", "Positive", 0.8)])
            .await
            .unwrap();
        assert_eq!(path, "out/batch_results.zip");

        let zip_bytes = storage.read_file(RESULTS_ZIP).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec![RESULTS_CSV, SUMMARY_JSON]);

        let summary_json = {
            let mut file = archive.by_name(SUMMARY_JSON).unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        let summary: serde_json::Value = serde_json::from_str(&summary_json).unwrap();
        assert_eq!(summary["positive"], 1);
    }
}
