pub mod batch;
pub mod export;
pub mod ingest;
pub mod reports;
pub mod session;
pub mod stepper;
pub mod validation;

pub use crate::domain::model::{
    ParsedUpload, PreviewTable, Record, ResultState, Stage, ValidationResult,
};
pub use crate::domain::ports::{BatchSubmitter, ConfigProvider, KeyValueStore, Storage};
pub use crate::utils::error::Result;
