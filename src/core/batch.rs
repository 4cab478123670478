use crate::core::export::{ExportSummary, ResultExporter};
use crate::core::stepper::UploadStepper;
use crate::core::validation::ValidationOptions;
use crate::core::{BatchSubmitter, PreviewTable, Storage, ValidationResult};
use crate::domain::sentiment::ClassifiedRecord;
use crate::utils::error::{ClientError, Result};
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub rows_submitted: usize,
    pub discarded_rows: usize,
    pub output_path: String,
    pub summary: ExportSummary,
}

#[derive(Debug, Clone)]
pub struct DryRunReport {
    pub rows: usize,
    pub discarded_rows: usize,
    pub preview: PreviewTable,
    pub validation: ValidationResult,
}

/// Runs one upload end to end without a user in the loop:
/// parse, validate, submit, export.
pub struct BatchEngine<S, B, O>
where
    S: Storage,
    B: BatchSubmitter<Output = Vec<ClassifiedRecord>>,
    O: Storage,
{
    storage: S,
    submitter: B,
    exporter: ResultExporter<O>,
    options: ValidationOptions,
    monitor: SystemMonitor,
}

impl<S, B, O> BatchEngine<S, B, O>
where
    S: Storage,
    B: BatchSubmitter<Output = Vec<ClassifiedRecord>>,
    O: Storage,
{
    pub fn new(storage: S, submitter: B, exporter: ResultExporter<O>, options: ValidationOptions) -> Self {
        Self::new_with_monitoring(storage, submitter, exporter, options, false)
    }

    pub fn new_with_monitoring(
        storage: S,
        submitter: B,
        exporter: ResultExporter<O>,
        options: ValidationOptions,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            storage,
            submitter,
            exporter,
            options,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self, path: &str) -> Result<BatchReport> {
        tracing::info!("Starting batch classification for {}", path);
        self.monitor.log_stats("Start");

        let mut stepper = UploadStepper::new(self.options);
        stepper.load_file(&self.storage, path).await?;
        log_preview(&stepper.preview(), stepper.records().len(), stepper.discarded_rows());
        self.monitor.log_stats("Parse");

        let validation = stepper.validate()?;
        if !validation.is_passed() {
            return Err(ClientError::UploadRejected {
                errors: validation.into_errors(),
            });
        }

        let rows = stepper.submit(&self.submitter).await?;
        self.monitor.log_stats("Classify");

        let output_path = self.exporter.export(stepper.headers(), &rows).await?;
        tracing::info!("📁 Results saved to: {}", output_path);
        self.monitor.log_stats("Export");
        self.monitor.log_final_stats();

        Ok(BatchReport {
            rows_submitted: stepper.records().len(),
            discarded_rows: stepper.discarded_rows(),
            output_path,
            summary: ExportSummary::from_rows(&rows),
        })
    }

    /// Parses and validates without calling the classifier.
    pub async fn dry_run(&self, path: &str) -> Result<DryRunReport> {
        let mut stepper = UploadStepper::new(self.options);
        stepper.load_file(&self.storage, path).await?;

        let rows = stepper.records().len();
        let preview = stepper.preview();
        let validation = stepper.validate()?;

        Ok(DryRunReport {
            rows,
            discarded_rows: stepper.discarded_rows(),
            preview,
            validation,
        })
    }
}

fn log_preview(preview: &PreviewTable, rows: usize, discarded: usize) {
    tracing::info!(
        "👀 Preview: {} rows, columns [{}]",
        rows,
        preview.columns.join(", ")
    );
    if discarded > 0 {
        tracing::info!("✂️ {} rows beyond the upload limit were not kept", discarded);
    }
}
