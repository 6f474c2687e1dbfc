//! Integration tests for CLI argument handling
//!
//! Tests argument validation from the command line without touching
//! any network service: every invocation here fails fast in clap or
//! only prints help.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_slopefinder"))
        .args(args)
        .output()
        .expect("Failed to execute slopefinder")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slopefinder"), "Help should mention slopefinder");
    assert!(stdout.contains("--lat"), "Help should mention --lat");
    assert!(stdout.contains("--date"), "Help should mention --date");
}

#[test]
fn test_missing_location_is_a_usage_error() {
    let output = run_cli(&[]);
    assert!(
        !output.status.success(),
        "Expected missing required args to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--lat"),
        "Should point at the missing argument: {}",
        stderr
    );
}

#[test]
fn test_oversized_page_size_is_a_usage_error() {
    let output = run_cli(&["--lat", "48.14", "--lng", "11.58", "--page-size", "11"]);
    assert!(
        !output.status.success(),
        "Expected page-size above 10 to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("page-size") || stderr.contains("invalid value"),
        "Should report the invalid page size: {}",
        stderr
    );
}

#[test]
fn test_page_zero_is_a_usage_error() {
    let output = run_cli(&["--lat", "48.14", "--lng", "11.58", "--page", "0"]);
    assert!(!output.status.success(), "Expected page 0 to fail");
}

#[test]
fn test_invalid_date_is_a_usage_error() {
    let output = run_cli(&["--lat", "48.14", "--lng", "11.58", "--date", "tomorrow"]);
    assert!(!output.status.success(), "Expected unparseable date to fail");
}
