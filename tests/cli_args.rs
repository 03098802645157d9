//! Integration tests for CLI argument handling
//!
//! Tests the --date, --user and --print flags from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mealboard"))
        .args(args)
        .output()
        .expect("Failed to execute mealboard")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mealboard"), "Help should mention mealboard");
    assert!(stdout.contains("--date"), "Help should mention --date flag");
    assert!(stdout.contains("--print"), "Help should mention --print flag");
}

#[test]
fn test_invalid_date_prints_error_and_exits() {
    let output = run_cli(&["--date", "2024-13-40", "--print"]);
    assert!(!output.status.success(), "Expected invalid date to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid date"),
        "Should print error message about invalid date: {}",
        stderr
    );
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = run_cli(&["--plan"]);
    assert!(!output.status.success());
}

#[test]
fn test_flags_are_accepted_with_help() {
    // With --help, it should succeed regardless of other flags
    let output = run_cli(&["--date", "2024-03-04", "--user", "kim", "--help"]);
    assert!(output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use chrono::NaiveDate;
    use clap::Parser;
    use mealboard::cli::{parse_date_arg, Cli, StartupConfig};

    #[test]
    fn test_cli_no_args_has_no_date() {
        let cli = Cli::parse_from(["mealboard"]);
        assert!(cli.date.is_none());
        assert!(!cli.print);
    }

    #[test]
    fn test_parse_date_arg_accepts_iso_dates() {
        assert_eq!(
            parse_date_arg("2024-03-04").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
    }

    #[test]
    fn test_startup_config_print_mode() {
        let cli = Cli::parse_from(["mealboard", "--print", "--date", "2024-03-04"]);
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let config = StartupConfig::from_cli(&cli, today).unwrap();
        assert!(config.print);
        assert_eq!(config.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }
}
