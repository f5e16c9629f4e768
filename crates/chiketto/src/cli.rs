//! Command line parsing and validation
//!
//! Parsing happens in two passes. clap handles the token grammar, `--help`
//! and `--version`; typed values (dates, enumerations, paired credentials)
//! are checked afterwards so that a malformed value never hides `--version`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::error::ErrorKind;
use clap::{Command, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

use chiketto_core::jql::DateWindow;
use chiketto_core::{Credentials, OutputFormat, SelectionType};

/// chiketto - Jira metrics for Kanban
#[derive(Parser, Debug)]
#[command(name = "chiketto")]
#[command(version)]
#[command(about = "Jira metrics for Kanban - extract issues with their workflow history")]
#[command(after_help = "\
EXAMPLES:
    chiketto CHIK --from-date 2021-01-01
    chiketto CHIK OPS -f 2021-01-01 --end-date 2021-03-31 --format csv -o issues.csv
    chiketto CHIK -f 2021-01-01 --selection-type modified

ENVIRONMENT:
    JIRA_HOST, JIRA_URL, JIRA_USERNAME, JIRA_TOKEN
    RUST_LOG=chiketto=debug      Show request paging on stderr

With no projects nothing is extracted.")]
pub struct Cli {
    /// Jira projects to extract
    #[arg(value_name = "PROJECT")]
    pub projects: Vec<String>,

    /// First day of the window (ISO-8601 date)
    #[arg(
        short = 'f',
        long = "from-date",
        visible_alias = "start-date",
        short_alias = 's',
        value_name = "DATE"
    )]
    pub from_date: Option<String>,

    /// Last day of the window, inclusive (ISO-8601 date, default: today)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Account used to call the Jira API
    #[arg(short, long, env = "JIRA_USERNAME", visible_alias = "jira-username")]
    pub username: Option<String>,

    /// API token associated with the account
    #[arg(
        short = 't',
        long,
        env = "JIRA_TOKEN",
        hide_env_values = true,
        visible_alias = "jira-token"
    )]
    pub api_token: Option<String>,

    /// Date the window applies to [possible values: created, modified]
    #[arg(long, value_name = "TYPE")]
    pub selection_type: Option<String>,

    /// Jira Cloud host, without .atlassian.net
    #[arg(long, env = "JIRA_HOST", value_name = "HOST")]
    pub jira_host: Option<String>,

    /// REST API root of a self-hosted Jira (overrides --jira-host)
    #[arg(long, env = "JIRA_URL", value_name = "URL")]
    pub jira_url: Option<String>,

    /// File to write to (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format [possible values: json, csv]
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Config file (default: ~/.config/chiketto/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Invalid usage, or a request for help/version text
///
/// Carries the clap error so rendering and exit codes match clap's own.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct UsageError(#[from] clap::Error);

impl UsageError {
    fn new(kind: ErrorKind, message: impl Display) -> Self {
        Self(Cli::command().error(kind, message))
    }

    fn missing(option: &str) -> Self {
        Self::new(
            ErrorKind::MissingRequiredArgument,
            format!("Missing option '{}'", option),
        )
    }

    fn invalid(option: &str, value: &str, expected: &str) -> Self {
        Self::new(
            ErrorKind::InvalidValue,
            format!("Invalid value '{}' for '{}': expected {}", value, option, expected),
        )
    }

    #[cfg(test)]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }

    /// 0 for help and version, 2 for usage errors
    #[cfg(test)]
    pub fn exit_code(&self) -> i32 {
        self.0.exit_code()
    }

    /// Print to stdout or stderr as appropriate and exit
    pub fn exit(&self) -> ! {
        self.0.exit()
    }
}

/// Validated parameters for one run
#[derive(Debug, Clone)]
pub struct Invocation {
    pub projects: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub selection_type: SelectionType,
    pub jira_host: Option<String>,
    pub jira_url: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub config: Option<PathBuf>,
}

impl Invocation {
    /// The extraction window, closing today when no end date was given
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date.unwrap_or(today))
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.api_token) {
            (Some(username), Some(token)) => Some(Credentials {
                username: username.clone(),
                token: token.clone(),
            }),
            _ => None,
        }
    }
}

/// Parse and validate process arguments (the first item is the binary name)
pub fn parse<I, T>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    parse_with(Cli::command(), args)
}

/// Like `parse`, but blind to `JIRA_*` variables in the test environment
#[cfg(test)]
pub fn parse_without_env<I, T>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let command = ["username", "api_token", "jira_host", "jira_url"]
        .into_iter()
        .fold(Cli::command(), |cmd, id| cmd.mut_arg(id, |arg| arg.env(None::<&'static str>)));
    parse_with(command, args)
}

fn parse_with<I, T>(command: Command, args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command.try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)?.validate()
}

const ISO_DATE: &str = "an ISO-8601 date (YYYY-MM-DD)";

impl Cli {
    /// Check typed values and turn the raw arguments into an `Invocation`
    pub fn validate(self) -> Result<Invocation, UsageError> {
        let from = self
            .from_date
            .ok_or_else(|| UsageError::missing("--start-date"))?;
        let start_date =
            parse_date(&from).ok_or_else(|| UsageError::invalid("--from-date", &from, ISO_DATE))?;

        let end_date = match self.end_date {
            Some(end) => Some(
                parse_date(&end).ok_or_else(|| UsageError::invalid("--end-date", &end, ISO_DATE))?,
            ),
            None => None,
        };
        if let Some(end) = end_date {
            if end < start_date {
                return Err(UsageError::new(
                    ErrorKind::ValueValidation,
                    format!("'--end-date' ({}) is before '--from-date' ({})", end, start_date),
                ));
            }
        }

        let selection_type = match self.selection_type {
            Some(s) => SelectionType::from_str(&s).ok_or_else(|| {
                UsageError::invalid(
                    "--selection-type",
                    &s,
                    &format!("one of {}", SelectionType::VARIANTS.join(", ")),
                )
            })?,
            None => SelectionType::default(),
        };

        let format = match self.format {
            Some(f) => Some(OutputFormat::from_str(&f).ok_or_else(|| {
                UsageError::invalid(
                    "--format",
                    &f,
                    &format!("one of {}", OutputFormat::VARIANTS.join(", ")),
                )
            })?),
            None => None,
        };

        match (&self.username, &self.api_token) {
            (Some(_), None) => return Err(UsageError::missing("--api-token")),
            (None, Some(_)) => return Err(UsageError::missing("--username")),
            _ => {}
        }

        Ok(Invocation {
            projects: self.projects,
            start_date,
            end_date,
            username: self.username,
            api_token: self.api_token,
            selection_type,
            jira_host: self.jira_host,
            jira_url: self.jira_url,
            output: self.output,
            format,
            config: self.config,
        })
    }
}

/// Parse an ISO-8601 calendar date, keeping only the date of a timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| basic_date(value))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// The basic form `YYYYMMDD`, exactly eight digits
fn basic_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_exits_zero() {
        let err = parse_without_env(["chiketto", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_version_wins_over_bad_values() {
        let args = ["chiketto", "--selection-type", "bogus", "--end-date", "nope", "--version"];
        let err = parse_without_env(args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn test_help_exits_zero() {
        let err = parse_without_env(["chiketto", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
        assert!(err.to_string().contains("--from-date"));
    }

    #[test]
    fn test_missing_from_date() {
        let err = parse_without_env(["chiketto"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Missing option '--start-date'"));
    }

    #[test]
    fn test_missing_from_date_with_projects() {
        let err = parse_without_env(["chiketto", "CHIK", "OPS"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Missing option '--start-date'"));
    }

    #[test]
    fn test_no_projects() {
        let inv = parse_without_env(["chiketto", "--from-date", "2021-01-01"]).unwrap();
        assert!(inv.projects.is_empty());
        assert_eq!(inv.start_date, date(2021, 1, 1));
        assert_eq!(inv.end_date, None);
        assert_eq!(inv.selection_type, SelectionType::Created);
    }

    #[test]
    fn test_exported_token_does_not_leak_into_tests() {
        let previous = std::env::var_os("JIRA_TOKEN");
        std::env::set_var("JIRA_TOKEN", "exported");
        let result = parse_without_env(["chiketto", "--from-date", "2021-01-01"]);
        match previous {
            Some(value) => std::env::set_var("JIRA_TOKEN", value),
            None => std::env::remove_var("JIRA_TOKEN"),
        }

        let inv = result.unwrap();
        assert!(inv.projects.is_empty());
        assert_eq!(inv.api_token, None);
        assert!(inv.credentials().is_none());
    }

    #[test]
    fn test_projects_keep_order() {
        let inv = parse_without_env(["chiketto", "OPS", "-f", "2021-01-01", "CHIK"]).unwrap();
        assert_eq!(inv.projects, vec!["OPS".to_string(), "CHIK".to_string()]);
    }

    #[test]
    fn test_start_date_aliases() {
        for args in [
            vec!["chiketto", "--start-date=2021-01-01"],
            vec!["chiketto", "-s", "2021-01-01"],
            vec!["chiketto", "-f", "2021-01-01"],
        ] {
            let inv = parse_without_env(args).unwrap();
            assert_eq!(inv.start_date, date(2021, 1, 1));
        }
    }

    #[test]
    fn test_valid_dates_are_accepted() {
        for value in [
            "2021-01-01",
            "2020-02-29",
            "1999-12-31",
            "2021-01-01T08:30:00",
            "2021-01-01 08:30:00",
            "2021-01-01T08:30:00Z",
            "2021-01-01T08:30:00+09:00",
            "20210101",
        ] {
            let inv = parse_without_env(["chiketto", "--from-date", value, "--end-date", value])
                .unwrap_or_else(|e| panic!("{} rejected: {}", value, e));
            assert_eq!(inv.start_date, inv.end_date.unwrap());
        }
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        for value in [
            "2021-02-29", "2021-13-01", "01/02/2021", "yesterday", "", "20211301", "2021011",
        ] {
            let err = parse_without_env(["chiketto", "--from-date", value]).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{} accepted", value);

            let args = ["chiketto", "--from-date", "2021-01-01", "--end-date", value];
            let err = parse_without_env(args).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{} accepted as end date", value);
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = parse_without_env(["chiketto", "-f", "2021-02-01", "--end-date", "2021-01-31"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("--end-date"));
    }

    #[test]
    fn test_selection_type() {
        let args = ["chiketto", "-f", "2021-01-01", "--selection-type", "modified"];
        let inv = parse_without_env(args).unwrap();
        assert_eq!(inv.selection_type, SelectionType::Modified);

        let args = ["chiketto", "-f", "2021-01-01", "--selection-type", "created"];
        let inv = parse_without_env(args).unwrap();
        assert_eq!(inv.selection_type, SelectionType::Created);
    }

    #[test]
    fn test_bad_selection_type_is_rejected() {
        for value in ["updated", "CREATED", "", "resolved"] {
            let args = ["chiketto", "-f", "2021-01-01", "--selection-type", value];
            let err = parse_without_env(args).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{} accepted", value);
            assert!(err.to_string().contains("--selection-type"));
        }
    }

    #[test]
    fn test_format() {
        let inv = parse_without_env(["chiketto", "-f", "2021-01-01", "--format", "CSV"]).unwrap();
        assert_eq!(inv.format, Some(OutputFormat::Csv));

        let err = parse_without_env(["chiketto", "-f", "2021-01-01", "--format", "xml"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_window_defaults_to_today() {
        let inv = parse_without_env(["chiketto", "-f", "2021-01-01"]).unwrap();
        let window = inv.window(date(2021, 6, 1));
        assert_eq!(window.start, date(2021, 1, 1));
        assert_eq!(window.end, date(2021, 6, 1));

        let inv = parse_without_env(["chiketto", "-f", "2021-01-01", "--end-date", "2021-01-31"])
            .unwrap();
        assert_eq!(inv.window(date(2021, 6, 1)).end, date(2021, 1, 31));
    }

    #[test]
    fn test_paired_credentials() {
        let args = ["chiketto", "-f", "2021-01-01", "-u", "dimwit", "-t", "s3cret"];
        let inv = parse_without_env(args).unwrap();
        let creds = inv.credentials().unwrap();
        assert_eq!(creds.username, "dimwit");
        assert_eq!(creds.token, "s3cret");
    }

    #[test]
    fn test_parse_date_keeps_calendar_date() {
        assert_eq!(parse_date("2021-01-01T23:59:59-08:00"), Some(date(2021, 1, 1)));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_parse_date_basic_form() {
        assert_eq!(parse_date("20210101"), Some(date(2021, 1, 1)));
        assert_eq!(parse_date("20200229"), Some(date(2020, 2, 29)));
        assert_eq!(parse_date("20210229"), None);
        assert_eq!(parse_date("202101011"), None);
    }
}
