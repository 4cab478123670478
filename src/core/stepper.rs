use crate::core::ingest::{parse_csv_bytes, parse_file};
use crate::core::validation::{validate_with_options, ValidationOptions};
use crate::core::{
    BatchSubmitter, ParsedUpload, PreviewTable, Record, ResultState, Stage, Storage,
    ValidationResult,
};
use crate::utils::error::Result;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub const PREVIEW_COLUMNS: usize = 6;
pub const PREVIEW_ROWS: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepperError {
    #[error("cannot {action} while in the {stage} step")]
    InvalidTransition { stage: &'static str, action: &'static str },

    #[error("upload has not passed validation")]
    NotReady,

    #[error("upload was already submitted")]
    AlreadySubmitted,

    #[error("upload view was disposed")]
    Disposed,
}

/// Handle for one in-flight parse. Results are only applied while the
/// ticket is the newest one and the stepper is alive.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    generation: u64,
    token: CancellationToken,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Upload → preview → result workflow for one CSV upload session.
pub struct UploadStepper {
    stage: Stage,
    upload: ParsedUpload,
    options: ValidationOptions,
    generation: u64,
    current: Option<CancellationToken>,
    lifetime: CancellationToken,
    submitted: bool,
}

impl UploadStepper {
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            stage: Stage::Upload,
            upload: ParsedUpload::empty(),
            options,
            generation: 0,
            current: None,
            lifetime: CancellationToken::new(),
            submitted: false,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn records(&self) -> &[Record] {
        &self.upload.records
    }

    pub fn headers(&self) -> &[String] {
        &self.upload.headers
    }

    pub fn discarded_rows(&self) -> usize {
        self.upload.discarded_rows
    }

    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Token tied to the stepper's lifetime; cancelling it disposes the stepper.
    pub fn lifetime_token(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    /// Starts a fresh upload. Any earlier upload, finished or in flight, is dropped.
    pub fn begin_upload(&mut self) -> Result<UploadTicket> {
        if self.is_disposed() {
            return Err(StepperError::Disposed.into());
        }
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        self.generation += 1;
        let token = self.lifetime.child_token();
        self.current = Some(token.clone());
        self.reset_to_upload();

        Ok(UploadTicket {
            generation: self.generation,
            token,
        })
    }

    /// Applies a finished parse. Returns `false` when the result is stale
    /// and was discarded.
    pub fn complete_upload(&mut self, ticket: &UploadTicket, parsed: ParsedUpload) -> bool {
        if ticket.is_cancelled() || ticket.generation != self.generation || self.is_disposed() {
            tracing::debug!(
                "🗑️ Dropping parse result for upload #{} (current #{})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        tracing::info!(
            "📄 Parsed {} rows ({} columns)",
            parsed.records.len(),
            parsed.headers.len()
        );
        self.current = None;
        self.upload = parsed;
        self.stage = Stage::Preview;
        true
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let ticket = self.begin_upload()?;
        self.complete_upload(&ticket, parse_csv_bytes(bytes));
        Ok(())
    }

    pub async fn load_file<S: Storage>(&mut self, storage: &S, path: &str) -> Result<()> {
        let ticket = self.begin_upload()?;
        match parse_with_cancel(storage, path, ticket.token()).await {
            Some(parsed) => {
                self.complete_upload(&ticket, parsed?);
                Ok(())
            }
            None => Err(StepperError::Disposed.into()),
        }
    }

    /// Leading columns and rows of the current upload, for display only.
    pub fn preview(&self) -> PreviewTable {
        let columns: Vec<String> = self
            .upload
            .headers
            .iter()
            .take(PREVIEW_COLUMNS)
            .cloned()
            .collect();

        let rows = self
            .upload
            .records
            .iter()
            .take(PREVIEW_ROWS)
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();

        PreviewTable { columns, rows }
    }

    pub fn back(&mut self) -> Result<()> {
        match self.stage {
            Stage::Preview => {
                self.reset_to_upload();
                Ok(())
            }
            ref other => Err(StepperError::InvalidTransition {
                stage: other.name(),
                action: "go back",
            }
            .into()),
        }
    }

    /// Runs validation and moves to the result step. A rejected upload keeps
    /// nothing for submission.
    pub fn validate(&mut self) -> Result<ValidationResult> {
        if self.stage != Stage::Preview {
            return Err(StepperError::InvalidTransition {
                stage: self.stage.name(),
                action: "validate",
            }
            .into());
        }

        let result = validate_with_options(&self.upload.records, self.options);
        if result.is_passed() {
            tracing::info!("✅ Validation passed for {} rows", self.upload.records.len());
            self.stage = Stage::Result(ResultState::Passed);
        } else {
            for error in result.errors() {
                tracing::warn!("❌ {}", error);
            }
            self.upload.records.clear();
            self.stage = Stage::Result(ResultState::Rejected(result.errors().to_vec()));
        }
        Ok(result)
    }

    /// Hands the validated records to `submitter`. Only valid once, after a
    /// passing validation.
    pub async fn submit<B: BatchSubmitter>(&mut self, submitter: &B) -> Result<B::Output> {
        if self.stage != Stage::Result(ResultState::Passed) {
            return Err(StepperError::NotReady.into());
        }
        if self.submitted {
            return Err(StepperError::AlreadySubmitted.into());
        }

        self.submitted = true;
        tracing::info!("🚀 Submitting {} rows", self.upload.records.len());
        submitter.submit(self.upload.records.clone()).await
    }

    /// Ends the stepper's lifetime; in-flight parses are discarded.
    pub fn dispose(&mut self) {
        self.lifetime.cancel();
        self.current = None;
    }

    fn reset_to_upload(&mut self) {
        self.upload = ParsedUpload::empty();
        self.stage = Stage::Upload;
        self.submitted = false;
    }
}

impl Default for UploadStepper {
    fn default() -> Self {
        Self::new(ValidationOptions::default())
    }
}

impl Drop for UploadStepper {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

/// Parses `path` unless `token` fires first.
pub async fn parse_with_cancel<S: Storage>(
    storage: &S,
    path: &str,
    token: &CancellationToken,
) -> Option<Result<ParsedUpload>> {
    tokio::select! {
        _ = token.cancelled() => None,
        parsed = parse_file(storage, path) => Some(parsed),
    }
}
