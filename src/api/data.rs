use crate::api::ApiClient;
use crate::domain::sentiment::{
    DashboardMetrics, Product, RepresentativeReview, ReviewKind, TopProducts, TrendPoint,
};
use crate::utils::error::Result;
use reqwest::Method;
use serde_json::Value;

pub const DEFAULT_TREND_DAYS: u32 = 30;
pub const DEFAULT_REVIEW_LIMIT: u32 = 10;

impl ApiClient {
    pub async fn metrics(&self) -> Result<DashboardMetrics> {
        self.get_data("/data/metrics", &[]).await
    }

    pub async fn sentiment_trend(&self, days: u32) -> Result<Vec<TrendPoint>> {
        self.get_data("/data/sentiment-trend", &[("days", days.to_string())])
            .await
    }

    pub async fn top_products(&self) -> Result<TopProducts> {
        self.get_data("/data/top-products", &[]).await
    }

    pub async fn representative_reviews(
        &self,
        kind: ReviewKind,
        limit: u32,
    ) -> Result<Vec<RepresentativeReview>> {
        self.get_data(
            "/data/representative-reviews",
            &[
                ("kind", kind.as_query().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn brands(&self) -> Result<Vec<String>> {
        self.get_data("/data/brands", &[]).await
    }

    pub async fn products(&self, brand: Option<&str>) -> Result<Vec<Product>> {
        match brand {
            Some(brand) => {
                self.get_data("/data/products", &[("brand", brand.to_string())])
                    .await
            }
            None => self.get_data("/data/products", &[]).await,
        }
    }

    /// Seeds the account with sample reviews. Returns the raw envelope.
    pub async fn initialize_sample_data(&self) -> Result<Value> {
        self.call(Method::POST, "/data/init-sample-data", &[], None)
            .await
    }

    /// Whether the account has any reviews. Errors count as "no".
    pub async fn has_data(&self) -> bool {
        match self.metrics().await {
            Ok(metrics) => metrics.total_reviews > 0,
            Err(e) => {
                tracing::debug!("has_data check failed: {}", e);
                false
            }
        }
    }
}

/// Everything the dashboard view shows, fetched concurrently.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub metrics: DashboardMetrics,
    pub trend: Vec<TrendPoint>,
    pub top_products: TopProducts,
}

impl ApiClient {
    pub async fn dashboard_snapshot(&self, days: u32) -> Result<DashboardSnapshot> {
        let (metrics, trend, top_products) = tokio::try_join!(
            self.metrics(),
            self.sentiment_trend(days),
            self.top_products()
        )?;
        Ok(DashboardSnapshot {
            metrics,
            trend,
            top_products,
        })
    }

    /// Loads the dashboard, seeding sample data first when the account is empty.
    pub async fn dashboard_or_seed(&self, days: u32) -> Result<DashboardSnapshot> {
        let snapshot = self.dashboard_snapshot(days).await?;
        if snapshot.metrics.total_reviews > 0 {
            return Ok(snapshot);
        }

        tracing::info!("🌱 No reviews yet, initializing sample data");
        self.initialize_sample_data().await?;
        self.dashboard_snapshot(days).await
    }
}
