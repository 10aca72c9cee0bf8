use crate::profile::FailurePolicy;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "reqprof")]
#[command(about = "Send a raw HTTPS request, or repeat it and report latency statistics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// The URL to request (scheme defaults to https)
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Number of requests to make and profile (0 or absent: single request)
    #[arg(long, short = 'p', value_name = "COUNT")]
    pub profile: Option<u32>,

    /// TCP connect timeout
    #[arg(long, default_value = "60s", value_parser = parse_duration)]
    pub connect_timeout: Duration,

    /// What to do when a profiled request fails without a response
    #[arg(long, value_enum, default_value = "abort")]
    pub on_error: OnError,

    /// Report format for profiling mode
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Table,
    Json,
    Csv,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnError {
    /// Stop the whole run on the first failed request
    Abort,
    /// Count the failure as an error sample and continue
    Record,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Record => FailurePolicy::Record,
        }
    }
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    if let Ok(d) = humantime::parse_duration(s) {
        return Ok(d);
    }

    // Bare number as seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    Err(format!(
        "Invalid duration '{}'. Examples: 500ms, 10s, 1m, 30",
        s
    ))
}

impl Cli {
    /// Requests to profile, or `None` for single-shot mode
    pub fn profile_count(&self) -> Option<u32> {
        self.profile.filter(|&n| n > 0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() {
            return Ok(());
        }

        match &self.url {
            None => return Err("--url is required. Add --help to see available flags".to_string()),
            Some(url) if url.trim().is_empty() => {
                return Err("--url must not be empty".to_string());
            }
            Some(_) => {}
        }

        if self.connect_timeout.is_zero() {
            return Err("--connect-timeout must be greater than zero".to_string());
        }

        if self.profile_count().is_none() && self.format != OutputFormat::Text {
            return Err("--format only applies together with --profile".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("reqprof").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_single_shot() {
        let cli = parse(&["--url", "example.com"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.profile_count(), None);
        assert_eq!(cli.connect_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_profile_zero_is_single_shot() {
        let cli = parse(&["--url=example.com", "--profile=0"]);
        assert_eq!(cli.profile_count(), None);
    }

    #[test]
    fn test_profile_count() {
        let cli = parse(&["--url=example.com", "--profile=10", "--on-error", "record"]);
        assert!(cli.validate().is_ok());
        assert_eq!(cli.profile_count(), Some(10));
        assert_eq!(FailurePolicy::from(cli.on_error), FailurePolicy::Record);
    }

    #[test]
    fn test_negative_profile_rejected() {
        let args = ["reqprof", "--url=example.com", "--profile=-1"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_missing_url() {
        let cli = parse(&["--profile", "3"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_format_requires_profile() {
        let cli = parse(&["--url", "example.com", "--format", "json"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_completions_need_no_url() {
        let cli = parse(&["completions", "bash"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = parse(&["--url", "example.com", "--connect-timeout", "0s"]);
        assert!(cli.validate().is_err());
    }
}
