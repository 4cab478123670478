pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, Settings};

pub use adapters::{FileKeyValueStore, MemoryKeyValueStore};
pub use api::{ApiClient, ClassifierSubmitter};
pub use core::{
    batch::BatchEngine, export::ResultExporter, reports::ReportBook, session::SessionContext,
    stepper::UploadStepper,
};
pub use utils::error::{ClientError, Result};
