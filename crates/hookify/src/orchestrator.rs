//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{ConfigError, HookifyConfig, Settings};
use crate::output::{ConversionSummary, FileView, Formatter, JsonReport};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use hookify_transformer::{
    process_source, BatchSummary, ComponentSource, ConversionSink, FileReport, FileStatus,
    SinkError, TransformResult,
};
use miette::Diagnostic;
use rayon::prelude::*;
use std::fs;
use std::sync::Mutex;
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// The workspace path could not be resolved.
    #[error("invalid workspace path: {0}")]
    InvalidWorkspace(String),

    /// The input directory does not exist.
    #[error("input directory not found: {0}")]
    #[diagnostic(help("pass --input or set `input` in hookify.json"))]
    InputMissing(Utf8PathBuf),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output directory could not be prepared.
    #[error("failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cleaning the output directory would delete inputs.
    #[error("input directory {input} is inside output directory {output}")]
    #[diagnostic(help("pass --no-clean or choose a separate output directory"))]
    OutputOverlapsInput {
        input: Utf8PathBuf,
        output: Utf8PathBuf,
    },

    /// The JSON report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Runs the conversion on all discovered files.
pub fn run(args: Args) -> Result<ConversionSummary, OrchestratorError> {
    let workspace = if args.workspace.is_relative() {
        let cwd = std::env::current_dir()
            .map_err(|e| OrchestratorError::InvalidWorkspace(e.to_string()))?;
        Utf8PathBuf::try_from(cwd)
            .map_err(|e| OrchestratorError::InvalidWorkspace(e.to_string()))?
            .join(&args.workspace)
    } else {
        args.workspace.clone()
    };

    // An explicit config must be valid; a discovered one only warns.
    let config = match &args.config {
        Some(path) => HookifyConfig::from_file(&workspace.join(path))?,
        None => HookifyConfig::load(&workspace),
    };
    let settings = Settings::resolve(&args, config, &workspace)?;

    if !settings.input.is_dir() {
        return Err(OrchestratorError::InputMissing(settings.input));
    }

    let ignore_set = build_ignore_set(&settings.ignore)?;
    let files = discover(&settings, &ignore_set);
    tracing::debug!(count = files.len(), input = %settings.input, "discovered files");

    if !settings.dry_run {
        prepare_output(&settings)?;
    }

    let mut outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| convert_file(path, &settings))
        .collect();
    outcomes.sort_by(|a, b| a.relative.cmp(&b.relative));

    let counts: BatchSummary = outcomes.iter().map(|o| &o.report).collect();
    let summary = ConversionSummary {
        converted: counts.converted,
        skipped: counts.skipped,
        errored: counts.errored,
        passed_through: counts.passed_through,
        fail_on_error: settings.fail_on_error,
    };
    tracing::debug!(
        converted = summary.converted,
        skipped = summary.skipped,
        errored = summary.errored,
        "conversion finished"
    );

    let formatter = Formatter::new(settings.format);
    if formatter.is_json() {
        let report = JsonReport {
            files: outcomes
                .iter()
                .map(|o| Formatter::format_json(o.view()))
                .collect(),
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &outcomes {
            print!("{}", formatter.format_human(outcome.view()));
        }
        println!("{}", summary.format());
    }

    Ok(summary)
}

/// Everything known about one processed file.
struct FileOutcome {
    relative: Utf8PathBuf,
    report: FileReport,
    source: String,
    generated: Option<String>,
}

impl FileOutcome {
    fn view(&self) -> FileView<'_> {
        FileView {
            path: &self.relative,
            report: &self.report,
            source: &self.source,
            generated: self.generated.as_deref(),
        }
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Lists convertible files under the input directory, sorted by path.
fn discover(settings: &Settings, ignore_set: &GlobSet) -> Vec<Utf8PathBuf> {
    let max_depth = if settings.recursive { usize::MAX } else { 1 };
    WalkDir::new(&settings.input)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| settings.matches_extension(p))
        // Outputs nested in the input tree are never inputs.
        .filter(|p| settings.output == settings.input || !p.starts_with(&settings.output))
        .filter(|p| {
            let relative = p.strip_prefix(&settings.input).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .collect()
}

/// Creates the output directory and removes previous outputs.
fn prepare_output(settings: &Settings) -> Result<(), OrchestratorError> {
    let output = &settings.output;
    let io_error = |source| OrchestratorError::OutputDir {
        path: output.clone(),
        source,
    };

    if settings.clean && output.is_dir() {
        if settings.input.starts_with(output) {
            return Err(OrchestratorError::OutputOverlapsInput {
                input: settings.input.clone(),
                output: output.clone(),
            });
        }
        for entry in WalkDir::new(output).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(path) = Utf8PathBuf::try_from(entry.into_path()) else {
                continue;
            };
            if settings.matches_extension(&path) {
                tracing::debug!(path = %path, "removing previous output");
                fs::remove_file(&path).map_err(io_error)?;
            }
        }
    }

    fs::create_dir_all(output).map_err(io_error)
}

fn convert_file(path: &Utf8Path, settings: &Settings) -> FileOutcome {
    let relative = path
        .strip_prefix(&settings.input)
        .unwrap_or(path)
        .to_path_buf();
    let identifier = path.file_stem().unwrap_or_default();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "failed to read file");
            return FileOutcome {
                relative,
                report: FileReport {
                    identifier: identifier.into(),
                    status: FileStatus::Errored(format!("failed to read file: {}", e)),
                    warnings: Vec::new(),
                },
                source: String::new(),
                generated: None,
            };
        }
    };

    let sink = FileSink {
        target: settings.output.join(&relative),
        dry_run: settings.dry_run,
        captured: Mutex::new(None),
    };
    let component = ComponentSource::new(identifier, source);
    let report = process_source(&component, &settings.transform, &sink);
    let generated = sink.captured.into_inner().ok().flatten();

    FileOutcome {
        relative,
        report,
        source: component.raw_text,
        generated,
    }
}

/// Writes one component's output to the mirrored path in the output tree.
struct FileSink {
    target: Utf8PathBuf,
    dry_run: bool,
    captured: Mutex<Option<String>>,
}

impl ConversionSink for FileSink {
    fn accept(&self, _source: &ComponentSource, result: &TransformResult) -> Result<(), SinkError> {
        if self.dry_run {
            if let Ok(mut captured) = self.captured.lock() {
                *captured = Some(result.code.clone());
            }
            return Ok(());
        }

        let io_error = |source| SinkError::Io {
            path: self.target.clone(),
            source,
        };
        if let Some(parent) = self.target.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&self.target, &result.code).map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn settings(root: &Utf8Path, argv: &[&str]) -> Settings {
        let args = Args::parse_from(argv.iter().copied());
        Settings::resolve(&args, HookifyConfig::default(), root).unwrap()
    }

    fn tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let (_dir, root) = tempdir();
        let input = root.join("in");
        fs::create_dir_all(input.join("nested")).unwrap();
        for name in ["b.jsx", "a.js", "notes.md", "skip.test.js", "nested/c.js"] {
            fs::write(input.join(name), "").unwrap();
        }

        let flat = settings(&root, &["hookify", "--input", "in", "--ignore", "*.test.js"]);
        let ignore = build_ignore_set(&flat.ignore).unwrap();
        let found: Vec<_> = discover(&flat, &ignore)
            .iter()
            .map(|p| p.strip_prefix(&input).unwrap().to_string())
            .collect();
        assert_eq!(found, vec!["a.js", "b.jsx"]);

        let deep = settings(&root, &["hookify", "--input", "in", "--recursive"]);
        let ignore = build_ignore_set(&deep.ignore).unwrap();
        assert_eq!(discover(&deep, &ignore).len(), 4);
    }

    #[test]
    fn test_invalid_glob() {
        let result = build_ignore_set(&["[".to_string()]);
        assert!(matches!(result, Err(OrchestratorError::InvalidGlob(_))));
    }

    #[test]
    fn test_prepare_output_cleans_matching_files() {
        let (_dir, root) = tempdir();
        fs::create_dir_all(root.join("in")).unwrap();
        let output = root.join("out");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("Old.js"), "stale").unwrap();
        fs::write(output.join("README.md"), "keep").unwrap();

        let s = settings(&root, &["hookify", "--input", "in", "--output", "out"]);
        prepare_output(&s).unwrap();
        assert!(!output.join("Old.js").exists());
        assert!(output.join("README.md").exists());
    }

    #[test]
    fn test_prepare_output_refuses_to_clean_input_parent() {
        let (_dir, root) = tempdir();
        fs::create_dir_all(root.join("src/class")).unwrap();

        let s = settings(&root, &["hookify", "--input", "src/class", "--output", "src"]);
        assert!(matches!(
            prepare_output(&s),
            Err(OrchestratorError::OutputOverlapsInput { .. })
        ));
    }

    #[test]
    fn test_convert_file_dry_run_captures_output() {
        let (_dir, root) = tempdir();
        let input = root.join("in");
        fs::create_dir_all(&input).unwrap();
        let path = input.join("Label.js");
        fs::write(
            &path,
            "class Label extends Component {\n  render() {\n    return <b>hi</b>;\n  }\n}\n",
        )
        .unwrap();

        let s = settings(&root, &["hookify", "--input", "in", "--dry-run"]);
        let outcome = convert_file(&path, &s);
        assert_eq!(outcome.relative, Utf8PathBuf::from("Label.js"));
        assert_eq!(outcome.report.identifier, "Label");
        assert!(outcome
            .generated
            .is_some_and(|code| code.contains("function Label(props) {")));
        assert!(!s.output.exists());
    }
}
