//! Configuration loading.

use crate::cli::{Args, OutputFormat};
use camino::{Utf8Path, Utf8PathBuf};
use hookify_transformer::TransformOptions;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Default directory containing class components.
pub const DEFAULT_INPUT: &str = "src/components/class";
/// Default directory receiving function components.
pub const DEFAULT_OUTPUT: &str = "src/components/functional";
/// Default file extensions.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx"];

/// Contents of a `hookify.json` file.
///
/// Every key is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct HookifyConfig {
    /// Directory containing class components.
    pub input: Option<Utf8PathBuf>,
    /// Directory receiving function components.
    pub output: Option<Utf8PathBuf>,
    /// File extensions to convert.
    pub extensions: Option<Vec<String>>,
    /// Glob patterns to ignore.
    pub ignore: Vec<String>,
    /// Instance receiver keywords.
    pub receivers: Option<Vec<String>>,
    /// Whether fixed outputs are used for well-known component names.
    pub special_cases: Option<bool>,
    /// Whether previous outputs are deleted before converting.
    pub clean: Option<bool>,
    /// Whether subdirectories are converted.
    pub recursive: Option<bool>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A receiver keyword is not an identifier.
    #[error("invalid receiver keyword: `{0}`")]
    InvalidReceiver(String),
}

impl HookifyConfig {
    /// File name looked up in the workspace root.
    pub const FILE_NAME: &'static str = "hookify.json";

    /// Loads `hookify.json` from the workspace root.
    ///
    /// A missing file yields the defaults. A malformed file is reported as a
    /// warning and the defaults are used.
    pub fn load(workspace: &Utf8Path) -> Self {
        let path = workspace.join(Self::FILE_NAME);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parses config file contents.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Effective settings after merging defaults, the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute input directory.
    pub input: Utf8PathBuf,
    /// Absolute output directory.
    pub output: Utf8PathBuf,
    /// Extensions without a leading dot.
    pub extensions: Vec<String>,
    /// Ignore globs.
    pub ignore: Vec<String>,
    /// Whether subdirectories are converted.
    pub recursive: bool,
    /// Whether previous outputs are deleted.
    pub clean: bool,
    /// Whether outputs are printed instead of written.
    pub dry_run: bool,
    /// Report format.
    pub format: OutputFormat,
    /// Whether errored files fail the run.
    pub fail_on_error: bool,
    /// Options passed to the transformer.
    pub transform: TransformOptions,
}

impl Settings {
    /// Merges CLI flags over the config file over defaults.
    pub fn resolve(
        args: &Args,
        config: HookifyConfig,
        workspace: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        let input = args
            .input
            .clone()
            .or(config.input)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_INPUT));
        let output = args
            .output
            .clone()
            .or(config.output)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));

        let extensions = if !args.extensions.is_empty() {
            args.extensions.clone()
        } else {
            config
                .extensions
                .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
        };
        let extensions = extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let mut ignore = config.ignore;
        ignore.extend(args.ignore.iter().cloned());

        let mut transform = TransformOptions::default();
        let receivers = if !args.receivers.is_empty() {
            Some(args.receivers.clone())
        } else {
            config.receivers
        };
        if let Some(receivers) = receivers {
            if let Some(bad) = receivers.iter().find(|r| !is_receiver(r)) {
                return Err(ConfigError::InvalidReceiver(bad.clone()));
            }
            transform.receivers = receivers.into_iter().map(Into::into).collect();
        }
        transform.special_cases = !args.no_special_cases && config.special_cases.unwrap_or(true);

        Ok(Self {
            input: workspace.join(input),
            output: workspace.join(output),
            extensions,
            ignore,
            recursive: args.recursive || config.recursive.unwrap_or(false),
            clean: !args.no_clean && config.clean.unwrap_or(true),
            dry_run: args.dry_run,
            format: args.format,
            fail_on_error: args.fail_on_error,
            transform,
        })
    }

    /// Whether `path` has one of the configured extensions.
    pub fn matches_extension(&self, path: &Utf8Path) -> bool {
        path.extension()
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

/// Whether `keyword` can name an instance receiver.
fn is_receiver(keyword: &str) -> bool {
    let mut chars = keyword.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
