//! CLI integration tests run against the built binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CHOICE_12: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<questestinterop>
  <item ident="Q1" title="Pick B">
    <presentation>
      <response_lid ident="RESP" rcardinality="Single">
        <render_choice shuffle="yes">
          <response_label ident="A"><material><mattext>A</mattext></material></response_label>
          <response_label ident="B"><material><mattext>B</mattext></material></response_label>
        </render_choice>
      </response_lid>
    </presentation>
    <resprocessing>
      <respcondition>
        <conditionvar><varequal respident="RESP">B</varequal></conditionvar>
        <setvar action="Set">1</setvar>
      </respcondition>
    </resprocessing>
  </item>
</questestinterop>"#;

fn qti_migrator(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qti-migrator"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("QTI_MIGRATOR_VERBOSITY")
        .env_remove("QTI_MIGRATOR_REPORT_FORMAT")
        .output()
        .unwrap()
}

fn setup() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("item12.xml");
    fs::write(&input, CHOICE_12).unwrap();
    let input = input.to_str().unwrap().to_string();
    (dir, input)
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let out = qti_migrator(dir.path(), &["version"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("qti-migrator v"));
}

#[test]
fn test_migrate_writes_output_file() {
    let (dir, input) = setup();
    let output = dir.path().join("item21.xml");
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-o", output.to_str().unwrap(), "-f", "1.2", "-t", "2.1"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains(r#"<choiceInteraction responseIdentifier="RESP" shuffle="true""#));
    assert!(written.contains("<value>B</value>"));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Migration completed successfully"));
}

#[test]
fn test_migrate_to_stdout_quietly() {
    let (dir, input) = setup();
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-f", "1.2", "-t", "2.1", "-v", "0"],
    );
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(!String::from_utf8_lossy(&out.stderr).contains("SUMMARY"));
}

#[test]
fn test_existing_output_requires_force() {
    let (dir, input) = setup();
    let output = dir.path().join("taken.xml");
    fs::write(&output, "keep me").unwrap();
    let output = output.to_str().unwrap();

    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-o", output, "-f", "1.2", "-t", "2.1"],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));
    assert_eq!(fs::read_to_string(output).unwrap(), "keep me");

    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-o", output, "-f", "1.2", "-t", "2.1", "--force"],
    );
    assert!(out.status.success());
    assert!(fs::read_to_string(output).unwrap().contains("choiceInteraction"));
}

#[test]
fn test_preview_writes_nothing() {
    let (dir, input) = setup();
    let output = dir.path().join("preview.xml");
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-o", output.to_str().unwrap(), "-f", "1.2", "-t", "2.1", "-p"],
    );
    assert!(out.status.success());
    assert!(!output.exists());
    assert!(String::from_utf8_lossy(&out.stderr).contains("SUMMARY"));
}

#[test]
fn test_json_report_format() {
    let (dir, input) = setup();
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-f", "1.2", "-t", "2.1", "-p", "--report-format", "json"],
    );
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains(r#""source_version": "1.2""#));
}

#[test]
fn test_unsupported_pair_fails() {
    let (dir, input) = setup();
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", &input, "-f", "1.2", "-t", "3.0"],
    );
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("migration cannot proceed"));
}

#[test]
fn test_config_file_sets_verbosity() {
    let (dir, input) = setup();
    let config = dir.path().join("quiet.yaml");
    fs::write(&config, "verbosity: 0\n").unwrap();
    let output = dir.path().join("out.xml");
    let out = qti_migrator(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "migrate",
            "-i",
            &input,
            "-o",
            output.to_str().unwrap(),
            "-f",
            "1.2",
            "-t",
            "2.1",
        ],
    );
    assert!(out.status.success());
    assert!(output.exists());
    assert!(!String::from_utf8_lossy(&out.stderr).contains("Migration completed"));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.xml");
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", missing.to_str().unwrap(), "-f", "1.2", "-t", "2.1"],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("IO error"));
    assert!(stderr.contains("nope.xml"));
}

#[test]
fn test_non_utf8_input_is_parsing_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("latin1.xml");
    fs::write(&input, b"<questestinterop><item ident=\"\xe9\"/></questestinterop>").unwrap();
    let out = qti_migrator(
        dir.path(),
        &["migrate", "-i", input.to_str().unwrap(), "-f", "1.2", "-t", "2.1"],
    );
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Parsing error: input is not valid UTF-8"));
}
