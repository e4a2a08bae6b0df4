//! Command-line integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SEARCH_BOX: &str = r#"import React, { Component } from 'react';

class SearchBox extends Component {
  state = { query: '' };

  handleChange = (event) => {
    this.setState({ query: event.target.value });
  }

  render() {
    return <input value={this.state.query} onChange={this.handleChange} />;
  }
}

export default SearchBox;
"#;

const HELPERS: &str = "export const clamp = (n, lo, hi) => Math.min(hi, Math.max(lo, n));\n";

/// A workspace with the default input directory populated.
fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("src/components/class");
    fs::create_dir_all(&input).unwrap();
    for (name, text) in files {
        fs::write(input.join(name), text).unwrap();
    }
    dir
}

fn hookify(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hookify").unwrap();
    cmd.arg("--workspace").arg(root);
    cmd
}

fn output_file(root: &Path, name: &str) -> std::path::PathBuf {
    root.join("src/components/functional").join(name)
}

#[test]
fn test_converts_into_output_directory() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX)]);

    hookify(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted SearchBox.js"))
        .stdout(predicate::str::contains("Converted: 1 file"));

    let code = fs::read_to_string(output_file(dir.path(), "SearchBox.js")).unwrap();
    assert!(code.contains("const [query, setQuery] = useState('');"));
    assert!(code.contains("setQuery(event.target.value);"));
    assert!(!code.contains("this."));
}

#[test]
fn test_non_class_files_are_skipped() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX), ("helpers.js", HELPERS)]);

    hookify(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Skipped helpers.js (not a class component)",
        ))
        .stdout(predicate::str::contains(
            "Skipped (not class components): 1 file",
        ));

    assert!(output_file(dir.path(), "SearchBox.js").exists());
    assert!(!output_file(dir.path(), "helpers.js").exists());
}

#[test]
fn test_hand_authored_counter() {
    let dir = workspace(&[("Counter.js", "class Counter extends Component {}\n")]);

    hookify(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Converted Counter.js (hand-authored output)",
        ));

    let code = fs::read_to_string(output_file(dir.path(), "Counter.js")).unwrap();
    assert!(code.contains("const [count, setCount] = useState(0);"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX)]);

    hookify(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("--- SearchBox.js ---"))
        .stdout(predicate::str::contains("function SearchBox(props) {"));

    assert!(!dir.path().join("src/components/functional").exists());
}

#[test]
fn test_json_report() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX), ("helpers.js", HELPERS)]);

    let output = hookify(dir.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["converted"], 1);
    assert_eq!(report["summary"]["skipped"], 1);
    assert_eq!(report["summary"]["errored"], 0);
    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["path"], "SearchBox.js");
    assert_eq!(files[0]["status"], "converted");
    assert_eq!(files[1]["path"], "helpers.js");
    assert_eq!(files[1]["status"], "skipped");
}

#[test]
fn test_missing_input_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    hookify(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("input directory not found"));
}

#[test]
fn test_fail_on_error_exit_code() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX)]);
    // A directory where the output file should go makes the write fail.
    fs::create_dir_all(output_file(dir.path(), "SearchBox.js")).unwrap();

    hookify(dir.path())
        .arg("--no-clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed SearchBox.js"));

    hookify(dir.path())
        .args(["--no-clean", "--fail-on-error"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Errored: 1 file"));
}

#[test]
fn test_clean_removes_previous_outputs() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX)]);
    let out = dir.path().join("src/components/functional");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("Stale.js"), "// old").unwrap();
    fs::write(out.join("notes.txt"), "keep me").unwrap();

    hookify(dir.path()).assert().success();

    assert!(!out.join("Stale.js").exists());
    assert!(out.join("notes.txt").exists());
    assert!(out.join("SearchBox.js").exists());
}

#[test]
fn test_no_clean_keeps_previous_outputs() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX)]);
    let out = dir.path().join("src/components/functional");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("Stale.js"), "// old").unwrap();

    hookify(dir.path()).arg("--no-clean").assert().success();

    assert!(out.join("Stale.js").exists());
    assert!(out.join("SearchBox.js").exists());
}

#[test]
fn test_config_file_sets_directories() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("legacy")).unwrap();
    fs::write(dir.path().join("legacy/SearchBox.jsx"), SEARCH_BOX).unwrap();
    fs::write(
        dir.path().join("hookify.json"),
        r#"{ "input": "legacy", "output": "modern" }"#,
    )
    .unwrap();

    hookify(dir.path()).assert().success();

    assert!(dir.path().join("modern/SearchBox.jsx").exists());
}

#[test]
fn test_explicit_malformed_config_fails() {
    let dir = workspace(&[("SearchBox.js", SEARCH_BOX)]);
    fs::write(dir.path().join("custom.json"), "{ nope").unwrap();

    hookify(dir.path())
        .args(["--config", "custom.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}
