//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use hookify_transformer::{FileReport, FileStatus, LineIndex, Outcome, Warning};
use serde::Serialize;

/// A formatted file report for JSON output.
#[derive(Debug, Serialize)]
pub struct FormattedFile {
    /// Path relative to the input directory.
    pub path: String,
    /// `converted`, `special-cased`, `passed-through`, `skipped` or `errored`.
    pub status: &'static str,
    /// Why the file was passed through or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Conversion warnings.
    pub warnings: Vec<FormattedWarning>,
    /// Generated code, in dry-run mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A formatted warning.
#[derive(Debug, Serialize)]
pub struct FormattedWarning {
    /// The warning code.
    pub code: String,
    /// The message.
    pub message: String,
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// Everything needed to report one file.
#[derive(Debug, Clone, Copy)]
pub struct FileView<'a> {
    /// Path relative to the input directory.
    pub path: &'a Utf8Path,
    /// The conversion report.
    pub report: &'a FileReport,
    /// The input text, for warning positions.
    pub source: &'a str,
    /// Generated code, in dry-run mode.
    pub generated: Option<&'a str>,
}

/// Formats file reports.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Whether reports are collected into one JSON document.
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Formats one file as human-readable output.
    pub fn format_human(&self, file: FileView<'_>) -> String {
        let mut output = status_line(file.path, &file.report.status);
        output.push('\n');

        let line_index = LineIndex::new(file.source);
        for warning in &file.report.warnings {
            let start = line_index.line_col(warning.range.start());
            output.push_str(&format!(
                "  warning[{}] {}:{}:{}: {}\n",
                warning.code,
                file.path,
                start.line + 1,
                start.col + 1,
                warning.message
            ));
            if let Some(line) = line_index.line_text(file.source, start.line) {
                output.push_str(&format!("    | {}\n", line.trim()));
            }
        }

        if let Some(code) = file.generated {
            output.push_str(&format!("--- {} ---\n{}", file.path, code));
            if !code.ends_with('\n') {
                output.push('\n');
            }
        }

        output
    }

    /// Formats one file into a JSON-ready struct.
    pub fn format_json(file: FileView<'_>) -> FormattedFile {
        let (status, reason) = match &file.report.status {
            FileStatus::Written(Outcome::Converted) => ("converted", None),
            FileStatus::Written(Outcome::SpecialCased) => ("special-cased", None),
            FileStatus::Written(Outcome::PassedThrough(reason)) => {
                ("passed-through", Some(reason.to_string()))
            }
            FileStatus::Skipped => ("skipped", Some("not a class component".to_string())),
            FileStatus::Errored(message) => ("errored", Some(message.clone())),
        };

        FormattedFile {
            path: file.path.to_string(),
            status,
            reason,
            warnings: format_warnings(&file.report.warnings, file.source),
            code: file.generated.map(str::to_string),
        }
    }
}

fn status_line(path: &Utf8Path, status: &FileStatus) -> String {
    match status {
        FileStatus::Written(Outcome::Converted) => format!("Converted {}", path),
        FileStatus::Written(Outcome::SpecialCased) => {
            format!("Converted {} (hand-authored output)", path)
        }
        FileStatus::Written(Outcome::PassedThrough(reason)) => {
            format!("Copied {} unchanged ({})", path, reason)
        }
        FileStatus::Skipped => format!("Skipped {} (not a class component)", path),
        FileStatus::Errored(message) => format!("Failed {}: {}", path, message),
    }
}

fn format_warnings(warnings: &[Warning], source: &str) -> Vec<FormattedWarning> {
    let line_index = LineIndex::new(source);
    warnings
        .iter()
        .map(|warning| {
            let start = line_index.line_col(warning.range.start());
            FormattedWarning {
                code: warning.code.to_string(),
                message: warning.message.clone(),
                line: start.line + 1,
                column: start.col + 1,
                offset: u32::from(warning.range.start()),
            }
        })
        .collect()
}

/// The JSON report document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Per-file reports, sorted by path.
    pub files: Vec<FormattedFile>,
    /// Aggregate counts.
    pub summary: &'a ConversionSummary,
}

/// Summary of a conversion run.
#[derive(Debug, Default, Serialize)]
pub struct ConversionSummary {
    /// Files written with a converted, hand-authored or passed-through output.
    pub converted: usize,
    /// Files that are not class components.
    pub skipped: usize,
    /// Files that failed.
    pub errored: usize,
    /// Of the converted files, those copied unchanged.
    pub passed_through: usize,
    /// Whether errored files fail the run.
    #[serde(skip)]
    pub fail_on_error: bool,
}

impl ConversionSummary {
    /// Total files seen.
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.errored
    }

    /// Formats the summary lines.
    pub fn format(&self) -> String {
        let mut output = format!(
            "====================================\nConverted: {}\nSkipped (not class components): {}\nErrored: {}",
            files(self.converted),
            files(self.skipped),
            files(self.errored)
        );
        if self.passed_through > 0 {
            output.push_str(&format!(
                "\n{} copied unchanged",
                files(self.passed_through)
            ));
        }
        output
    }
}

fn files(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{} files", count)
    }
}
