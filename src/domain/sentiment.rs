use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Ok(SentimentLabel::Positive),
            "neutral" | "neu" => Ok(SentimentLabel::Neutral),
            "negative" | "neg" => Ok(SentimentLabel::Negative),
            other => Err(ClientError::ValidationError {
                message: format!("Unknown sentiment label: {}", other),
            }),
        }
    }
}

impl TryFrom<String> for SentimentLabel {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Single-text classifier answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub confidence: f64,
    #[serde(default)]
    pub lang: String,
}

/// One row returned by the batch classifier: the submitted columns plus the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub label: SentimentLabel,
    pub confidence: f64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ClassifiedRecord {
    /// Cell text for `column`, as it would appear in an exported CSV.
    pub fn cell(&self, column: &str) -> String {
        match column {
            "label" => self.label.to_string(),
            "confidence" => self.confidence.to_string(),
            _ => match self.fields.get(column) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub negative: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_reviews: u64,
    #[serde(default)]
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub pos: f64,
    #[serde(default)]
    pub neu: f64,
    #[serde(default)]
    pub neg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    #[serde(alias = "productId", alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub conf: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopProducts {
    #[serde(default)]
    pub pos: Vec<TopProduct>,
    #[serde(default)]
    pub neg: Vec<TopProduct>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewKind {
    Pos,
    Neg,
}

impl ReviewKind {
    pub fn as_query(&self) -> &'static str {
        match self {
            ReviewKind::Pos => "pos",
            ReviewKind::Neg => "neg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeReview {
    #[serde(alias = "_id")]
    pub id: String,
    pub snippet: String,
    pub product: ProductRef,
    #[serde(default)]
    pub conf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "productId", alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSentiment {
    pub label: SentimentLabel,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub sentiment: Option<ReviewSentiment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl Default for ReviewPage {
    fn default() -> Self {
        Self {
            reviews: Vec::new(),
            pagination: Pagination {
                page: 1,
                limit: 20,
                total: 0,
                pages: 0,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sentiment: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub text: String,
    pub product_id: String,
    pub product_name: String,
    pub brand: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl FromStr for Cadence {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            "custom" => Ok(Cadence::Custom),
            other => Err(ClientError::ValidationError {
                message: format!("Unknown cadence: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(alias = "_id")]
    pub id: String,
    pub cadence: Cadence,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_time: Option<String>,
    #[serde(default, alias = "isActive")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub cadence: Cadence,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_time: Option<String>,
}

/// Signed-in user, persisted under the `bt:user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

impl AuthPayload {
    pub fn into_user(self) -> User {
        User {
            token: Some(self.token),
            ..self.user
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub created_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
