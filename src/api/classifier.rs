use crate::api::ApiClient;
use crate::core::{BatchSubmitter, Record};
use crate::domain::sentiment::{Classification, ClassifiedRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::json;

impl ApiClient {
    pub async fn classify_single(&self, text: &str) -> Result<Classification> {
        self.post_data("/reviews/classifier/single", json!({ "text": text }))
            .await
            .inspect_err(|e| tracing::error!("Classification error: {}", e))
    }

    pub async fn classify_batch(&self, records: &[Record]) -> Result<Vec<ClassifiedRecord>> {
        let rows: Vec<ClassifiedRecord> = self
            .post_data("/reviews/classifier/batch", json!({ "reviews": records }))
            .await
            .inspect_err(|e| tracing::error!("Batch classification error: {}", e))?;

        tracing::info!("🏷️ Classified {} of {} rows", rows.len(), records.len());
        Ok(rows)
    }
}

/// Sends a validated upload to the batch classifier.
#[derive(Debug, Clone)]
pub struct ClassifierSubmitter {
    client: ApiClient,
}

impl ClassifierSubmitter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BatchSubmitter for ClassifierSubmitter {
    type Output = Vec<ClassifiedRecord>;

    async fn submit(&self, records: Vec<Record>) -> Result<Self::Output> {
        self.client.classify_batch(&records).await
    }
}
