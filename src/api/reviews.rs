use crate::api::ApiClient;
use crate::domain::sentiment::{NewReview, Review, ReviewPage, ReviewQuery};
use crate::utils::error::Result;

impl ApiClient {
    pub async fn reviews(&self, query: &ReviewQuery) -> Result<ReviewPage> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(sentiment) = &query.sentiment {
            params.push(("sentiment", sentiment.clone()));
        }
        if let Some(brand) = &query.brand {
            params.push(("brand", brand.clone()));
        }

        self.get_data("/reviews", &params).await
    }

    pub async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.post_data("/reviews", serde_json::to_value(review)?)
            .await
            .inspect_err(|e| tracing::error!("Create review error: {}", e))
    }
}
