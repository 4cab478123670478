use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One uploaded row: column name to cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.data.get(column).map(String::as_str)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.data.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Output of the CSV parser, already truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUpload {
    /// Header row in file order.
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    /// Data rows dropped by the record cap.
    pub discarded_rows: usize,
}

impl ParsedUpload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ordered list of user-facing validation messages. Empty means passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

impl From<Vec<String>> for ValidationResult {
    fn from(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState {
    Passed,
    Rejected(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Preview,
    Result(ResultState),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Preview => "preview",
            Stage::Result(_) => "result",
        }
    }

    /// 1-based position in the three-step indicator.
    pub fn step_number(&self) -> usize {
        match self {
            Stage::Upload => 1,
            Stage::Preview => 2,
            Stage::Result(_) => 3,
        }
    }
}

/// Display-only slice of the upload: leading columns and rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
