//! Batch conversion.
//!
//! Runs many components through [`transform`] and hands each result to a
//! [`ConversionSink`]. One component failing, even by panicking, never
//! prevents the others from being processed.

use crate::error::SinkError;
use crate::extract::is_class_component;
use crate::transform::{transform, Outcome, PassThroughReason, TransformOptions, TransformResult};
use crate::types::{ComponentSource, Warning};
use smol_str::SmolStr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

/// Receives converted components.
pub trait ConversionSink: Sync {
    /// Accepts the output for one component.
    fn accept(&self, source: &ComponentSource, result: &TransformResult) -> Result<(), SinkError>;
}

/// A sink that keeps outputs in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: Mutex<Vec<(SmolStr, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accepted outputs, in acceptance order.
    pub fn outputs(&self) -> Vec<(SmolStr, String)> {
        match self.outputs.lock() {
            Ok(outputs) => outputs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The output accepted for `identifier`, if any.
    pub fn get(&self, identifier: &str) -> Option<String> {
        self.outputs()
            .into_iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, code)| code)
    }
}

impl ConversionSink for MemorySink {
    fn accept(&self, source: &ComponentSource, result: &TransformResult) -> Result<(), SinkError> {
        let mut outputs = self
            .outputs
            .lock()
            .map_err(|_| SinkError::Rejected("memory sink lock poisoned".to_string()))?;
        outputs.push((source.identifier.clone(), result.code.clone()));
        Ok(())
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// An output was written.
    Written(Outcome),
    /// The source is not a class component and nothing was written.
    Skipped,
    /// Conversion or writing failed.
    Errored(String),
}

/// Per-file report.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// The component identifier.
    pub identifier: SmolStr,
    /// What happened.
    pub status: FileStatus,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

/// Counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files written with a converted or hand-authored output.
    pub converted: usize,
    /// Files that were not class components.
    pub skipped: usize,
    /// Files that failed.
    pub errored: usize,
    /// Of the converted files, those whose output is the unchanged input.
    pub passed_through: usize,
}

impl BatchSummary {
    /// Counts one report.
    pub fn record(&mut self, report: &FileReport) {
        match &report.status {
            FileStatus::Written(outcome) => {
                self.converted += 1;
                if matches!(outcome, Outcome::PassedThrough(_)) {
                    self.passed_through += 1;
                }
            }
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Errored(_) => self.errored += 1,
        }
    }

    /// Total files seen.
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.errored
    }
}

impl<'a> FromIterator<&'a FileReport> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = &'a FileReport>>(iter: I) -> Self {
        let mut summary = BatchSummary::default();
        for report in iter {
            summary.record(report);
        }
        summary
    }
}

/// Converts one component and hands the result to `sink`.
///
/// Sources that do not declare a class component are skipped without writing.
/// A panic during conversion is caught: the original text is written in its
/// place and the file is reported as errored.
pub fn process_source(
    source: &ComponentSource,
    options: &TransformOptions,
    sink: &dyn ConversionSink,
) -> FileReport {
    process_with(source, options, sink, transform)
}

fn process_with<F>(
    source: &ComponentSource,
    options: &TransformOptions,
    sink: &dyn ConversionSink,
    convert: F,
) -> FileReport
where
    F: Fn(&ComponentSource, &TransformOptions) -> TransformResult,
{
    let identifier = source.identifier.clone();
    let is_special = options.special_cases && crate::special::lookup(&identifier).is_some();

    if !is_special && !is_class_component(&source.raw_text) {
        tracing::debug!(identifier = %identifier, "skipping source without a class component");
        return FileReport {
            identifier,
            status: FileStatus::Skipped,
            warnings: Vec::new(),
        };
    }

    let (result, fault) = match panic::catch_unwind(AssertUnwindSafe(|| convert(source, options))) {
        Ok(result) => (result, None),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(identifier = %identifier, error = %message, "conversion failed");
            let result = TransformResult::pass_through(
                source,
                PassThroughReason::InternalFault(message.clone()),
            );
            (result, Some(message))
        }
    };

    if let Err(err) = sink.accept(source, &result) {
        tracing::error!(identifier = %identifier, error = %err, "failed to write output");
        return FileReport {
            identifier,
            status: FileStatus::Errored(err.to_string()),
            warnings: result.warnings,
        };
    }

    let status = match fault {
        Some(message) => FileStatus::Errored(message),
        None => FileStatus::Written(result.outcome),
    };
    FileReport {
        identifier,
        status,
        warnings: result.warnings,
    }
}

/// Converts every source in order.
pub fn process_batch<'a>(
    sources: impl IntoIterator<Item = &'a ComponentSource>,
    options: &TransformOptions,
    sink: &dyn ConversionSink,
) -> (Vec<FileReport>, BatchSummary) {
    let reports: Vec<FileReport> = sources
        .into_iter()
        .map(|source| process_source(source, options, sink))
        .collect();
    let summary = reports.iter().collect();
    (reports, summary)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during conversion".to_string()
    }
}
