//! Integration tests for the parhist CLI.
//!
//! These drive the real binary end to end: spawning worker subprocesses,
//! collecting results through the completion notifier, and checking the
//! persisted report files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Get a command for the parhist binary.
fn parhist() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("parhist").unwrap()
}

/// Get a command with the stagger sleeps disabled, writing into `dir`.
fn parhist_fast(dir: &Path) -> Command {
    let mut cmd = parhist();
    cmd.arg("--output-dir")
        .arg(dir)
        .arg("--stagger-base-ms")
        .arg("0")
        .arg("--stagger-step-ms")
        .arg("0");
    cmd
}

/// List the persisted report files in a directory, sorted.
fn report_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "hist"))
        .collect();
    files.sort();
    files
}

// ============================================================================
// Configuration Error Tests
// ============================================================================

#[test]
fn test_no_inputs_is_a_config_error() {
    let dir = tempdir().unwrap();

    parhist_fast(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no input files provided"));

    // Rejected before any process creation: no side effects at all.
    assert!(report_files(dir.path()).is_empty());
}

#[test]
fn test_too_many_inputs_rejected_before_spawn() {
    let dir = tempdir().unwrap();
    let inputs: Vec<String> = (0..101).map(|i| format!("f{}.txt", i)).collect();

    parhist_fast(dir.path())
        .args(&inputs)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("too many input files"))
        .stderr(predicate::str::contains("maximum 100"));

    assert!(report_files(dir.path()).is_empty());
}

// ============================================================================
// Histogram Runs
// ============================================================================

#[test]
fn test_single_file_produces_one_report() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("hello.txt");
    fs::write(&input, "AbcAbc").unwrap();
    let out = dir.path().join("out");

    parhist_fast(&out).arg(&input).assert().success();

    let reports = report_files(&out);
    assert_eq!(reports.len(), 1);

    let contents = fs::read_to_string(&reports[0]).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 26);
    assert_eq!(lines[0], "a=2");
    assert_eq!(lines[1], "b=2");
    assert_eq!(lines[2], "c=2");
    assert_eq!(lines[3..].iter().filter(|l| l.ends_with("=0")).count(), 23);
}

#[test]
fn test_each_file_gets_its_own_report() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let mut inputs = Vec::new();
    for (name, contents) in [("a.txt", "aaaa"), ("b.txt", "bb"), ("c.txt", "c")] {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        inputs.push(path);
    }

    parhist_fast(&out)
        .args(&inputs)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 3 workers"));

    let reports = report_files(&out);
    assert_eq!(reports.len(), 3);
    for report in &reports {
        assert_eq!(fs::read_to_string(report).unwrap().lines().count(), 26);
    }
}

#[test]
fn test_empty_file_yields_all_zero_report() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    fs::write(&input, "").unwrap();
    let out = dir.path().join("out");

    parhist_fast(&out).arg(&input).assert().success();

    let reports = report_files(&out);
    assert_eq!(reports.len(), 1);
    let contents = fs::read_to_string(&reports[0]).unwrap();
    assert_eq!(contents.lines().count(), 26);
    assert!(contents.lines().all(|line| line.ends_with("=0")));
}

#[test]
fn test_case_permutation_produces_identical_reports() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let lower = dir.path().join("lower.txt");
    let mixed = dir.path().join("mixed.txt");
    fs::write(&lower, "hello world").unwrap();
    fs::write(&mixed, "HeLLo WoRLD").unwrap();

    parhist_fast(&out).arg(&lower).arg(&mixed).assert().success();

    let reports = report_files(&out);
    assert_eq!(reports.len(), 2);
    assert_eq!(
        fs::read_to_string(&reports[0]).unwrap(),
        fs::read_to_string(&reports[1]).unwrap()
    );
}

#[test]
fn test_output_directory_is_created() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("x.txt");
    fs::write(&input, "x").unwrap();
    let out = dir.path().join("deeply").join("nested").join("out");

    parhist_fast(&out).arg(&input).assert().success();

    assert_eq!(report_files(&out).len(), 1);
}

// ============================================================================
// Worker Failure Isolation
// ============================================================================

#[test]
fn test_unreadable_input_does_not_disturb_siblings() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let good = dir.path().join("good.txt");
    fs::write(&good, "fine").unwrap();
    let missing = dir.path().join("no-such-file.txt");

    // The failing worker exits with code 1 on its own; the run as a whole
    // still completes successfully.
    parhist_fast(&out)
        .arg(&missing)
        .arg(&good)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 2 workers"));

    assert_eq!(report_files(&out).len(), 1);
}

// ============================================================================
// Interrupt Workers
// ============================================================================

#[test]
fn test_sig_worker_is_interrupted_and_persists_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let f1 = dir.path().join("f1.txt");
    let f2 = dir.path().join("f2.txt");
    fs::write(&f1, "one").unwrap();
    fs::write(&f2, "two").unwrap();

    parhist_fast(&out)
        .arg("--sig-timeout-ms")
        .arg("30000")
        .arg(&f1)
        .arg("SIG")
        .arg(&f2)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 3 workers"));

    // The interrupted worker terminated (it is among the 3 above) but
    // produced no report.
    assert_eq!(report_files(&out).len(), 2);
}

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn test_help_displays() {
    parhist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parhist"))
        .stdout(predicate::str::contains("--output-dir"))
        // Hidden worker plumbing stays hidden.
        .stdout(predicate::str::contains("--internal-worker").not());
}

#[test]
fn test_version_displays() {
    parhist()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
