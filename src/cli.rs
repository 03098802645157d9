//! Command-line interface parsing for mealboard
//!
//! This module handles parsing of CLI arguments using clap: the starting day,
//! an optional user to sign in as, and the non-interactive --print mode.

use chrono::{Local, NaiveDate};
use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The --date value is not a calendar date
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD, for example 2024-03-04")]
    InvalidDate(String),
}

/// mealboard - Browse and rate school lunch menus
#[derive(Parser, Debug)]
#[command(name = "mealboard")]
#[command(about = "School meal menus with ratings and favorites")]
#[command(version)]
pub struct Cli {
    /// Day to open on, as YYYY-MM-DD (defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Sign in as this user id at startup
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Print the day's menu with ratings and exit instead of opening the TUI
    #[arg(long)]
    pub print: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Day the window is centered on
    pub date: NaiveDate,
    /// User to sign in before the first render
    pub user: Option<String>,
    /// Print instead of running the TUI
    pub print: bool,
}

/// Parses a --date argument.
///
/// # Arguments
/// * `s` - The date string from CLI
///
/// # Returns
/// * `Ok(NaiveDate)` for a valid `YYYY-MM-DD` date
/// * `Err(CliError::InvalidDate)` otherwise
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    /// * `today` - Day used when no --date was given
    pub fn from_cli(cli: &Cli, today: NaiveDate) -> Result<Self, CliError> {
        let date = match &cli.date {
            Some(value) => parse_date_arg(value)?,
            None => today,
        };
        Ok(StartupConfig {
            date,
            user: cli.user.clone(),
            print: cli.print,
        })
    }

    /// Like `from_cli` with the local calendar day as the default
    pub fn from_cli_today(cli: &Cli) -> Result<Self, CliError> {
        Self::from_cli(cli, Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_parse_date_arg_valid() {
        assert_eq!(
            parse_date_arg("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_date_arg_invalid() {
        let result = parse_date_arg("2023-02-29");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
        assert!(err.to_string().contains("2023-02-29"));

        assert!(parse_date_arg("20240304").is_err());
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["mealboard"]);
        assert!(cli.date.is_none());
        assert!(cli.user.is_none());
        assert!(!cli.print);
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::parse_from(["mealboard", "--date", "2024-03-05", "--user", "kim", "--print"]);
        assert_eq!(cli.date.as_deref(), Some("2024-03-05"));
        assert_eq!(cli.user.as_deref(), Some("kim"));
        assert!(cli.print);
    }

    #[test]
    fn test_startup_config_defaults_to_today() {
        let cli = Cli::parse_from(["mealboard"]);
        let config = StartupConfig::from_cli(&cli, today()).unwrap();
        assert_eq!(config.date, today());
        assert!(config.user.is_none());
        assert!(!config.print);
    }

    #[test]
    fn test_startup_config_uses_given_date() {
        let cli = Cli::parse_from(["mealboard", "--date", "2024-12-25", "--user", "lee"]);
        let config = StartupConfig::from_cli(&cli, today()).unwrap();
        assert_eq!(config.date, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        assert_eq!(config.user.as_deref(), Some("lee"));
    }

    #[test]
    fn test_startup_config_invalid_date() {
        let cli = Cli::parse_from(["mealboard", "--date", "tomorrow"]);
        assert!(StartupConfig::from_cli(&cli, today()).is_err());
    }
}
