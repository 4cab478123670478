use anyhow::Result;
use httpmock::prelude::*;
use sentiment_client::core::validation::ValidationOptions;
use sentiment_client::{
    ApiClient, BatchEngine, ClassifierSubmitter, ClientError, LocalStorage, ResultExporter,
};
use serde_json::json;
use std::io::Read;
use tempfile::TempDir;

const REVIEWS_CSV: &str = "review_text,brand,product_name\n\
Battery lasts all day,Aurora,A1 Phone\n\
Screen cracked in a week,Aurora,A1 Phone\n\
\n\
It is fine,Zenith,Z Buds\n";

fn engine(
    server: &MockServer,
    input_dir: &TempDir,
    output_dir: &TempDir,
    zip_output: bool,
) -> BatchEngine<LocalStorage, ClassifierSubmitter, LocalStorage> {
    let output_path = output_dir.path().to_string_lossy().to_string();
    BatchEngine::new(
        LocalStorage::new(input_dir.path().to_string_lossy().to_string()),
        ClassifierSubmitter::new(ApiClient::new(server.base_url()).with_token(Some("jwt".into()))),
        ResultExporter::new(LocalStorage::new(output_path.clone()), output_path, zip_output),
        ValidationOptions::default(),
    )
}

fn classified_rows() -> serde_json::Value {
    json!({
        "success": true,
        "data": [
            {"review_text": "Battery lasts all day", "brand": "Aurora", "product_name": "A1 Phone", "label": "Positive", "confidence": 0.97},
            {"review_text": "Screen cracked in a week", "brand": "Aurora", "product_name": "A1 Phone", "label": "Negative", "confidence": 0.91},
            {"review_text": "It is fine", "brand": "Zenith", "product_name": "Z Buds", "label": "Neutral", "confidence": 0.6}
        ]
    })
}

#[tokio::test]
async fn test_end_to_end_batch_writes_csv() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("reviews.csv"), REVIEWS_CSV)?;

    let server = MockServer::start();
    let classifier = server.mock(|when, then| {
        when.method(POST)
            .path("/reviews/classifier/batch")
            .header("authorization", "Bearer jwt")
            .body_contains("Battery lasts all day");
        then.status(200).json_body(classified_rows());
    });

    let report = engine(&server, &input_dir, &output_dir, false)
        .run("reviews.csv")
        .await?;

    classifier.assert();
    assert_eq!(report.rows_submitted, 3);
    assert_eq!(report.summary.positive, 1);
    assert_eq!(report.summary.negative, 1);
    assert_eq!(report.summary.neutral, 1);
    assert!(report.output_path.ends_with("batch_results.csv"));

    let written = std::fs::read_to_string(output_dir.path().join("batch_results.csv"))?;
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("review_text,brand,product_name,label,confidence"));
    assert_eq!(
        lines.next(),
        Some("Battery lasts all day,Aurora,A1 Phone,Positive,0.97")
    );
    assert_eq!(written.lines().count(), 4);
    Ok(())
}

#[tokio::test]
async fn test_zip_output_contains_csv_and_summary() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("reviews.csv"), REVIEWS_CSV)?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/reviews/classifier/batch");
        then.status(200).json_body(classified_rows());
    });

    let report = engine(&server, &input_dir, &output_dir, true)
        .run("reviews.csv")
        .await?;
    assert!(report.output_path.ends_with("batch_results.zip"));

    let zip_data = std::fs::read(output_dir.path().join("batch_results.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 2);

    let mut summary_text = String::new();
    archive
        .by_name("summary.json")?
        .read_to_string(&mut summary_text)?;
    let summary: serde_json::Value = serde_json::from_str(&summary_text)?;
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["positive"], 1);

    let mut csv_text = String::new();
    archive
        .by_name("batch_results.csv")?
        .read_to_string(&mut csv_text)?;
    assert!(csv_text.contains("It is fine,Zenith,Z Buds,Neutral,0.6"));
    Ok(())
}

#[tokio::test]
async fn test_rejected_upload_never_calls_classifier() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("reviews.csv"), "review_text\ngood\n")?;

    let server = MockServer::start();
    let classifier = server.mock(|when, then| {
        when.method(POST).path("/reviews/classifier/batch");
        then.status(200).json_body(classified_rows());
    });

    let err = engine(&server, &input_dir, &output_dir, false)
        .run("reviews.csv")
        .await
        .unwrap_err();

    classifier.assert_hits(0);
    match err {
        ClientError::UploadRejected { errors } => {
            assert_eq!(errors[0], "Missing required columns: brand");
            assert_eq!(errors[1], "Must include either product_id OR product_name");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!output_dir.path().join("batch_results.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_classifier_failure_is_surfaced() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("reviews.csv"), REVIEWS_CSV)?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/reviews/classifier/batch");
        then.status(503)
            .json_body(json!({"success": false, "message": "Model is warming up"}));
    });

    let err = engine(&server, &input_dir, &output_dir, false)
        .run("reviews.csv")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ApiError { status: 503, .. }));
    assert_eq!(err.user_friendly_message(), "Model is warming up");
    assert!(!output_dir.path().join("batch_results.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_is_truncated_before_submission() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;

    let mut csv_text = String::from("review_text,brand,product_id\n");
    for i in 1..=600 {
        csv_text.push_str(&format!("review {i},Acme,P{i}\n"));
    }
    std::fs::write(input_dir.path().join("big.csv"), csv_text)?;

    let server = MockServer::start();
    let rows: Vec<serde_json::Value> = (1..=500)
        .map(|i| json!({"review_text": format!("review {i}"), "brand": "Acme", "product_id": format!("P{i}"), "label": "Neutral", "confidence": 0.5}))
        .collect();
    server.mock(|when, then| {
        when.method(POST).path("/reviews/classifier/batch");
        then.status(200).json_body(json!({"success": true, "data": rows}));
    });

    let report = engine(&server, &input_dir, &output_dir, false)
        .run("big.csv")
        .await?;

    assert_eq!(report.rows_submitted, 500);
    assert_eq!(report.discarded_rows, 100);
    Ok(())
}
