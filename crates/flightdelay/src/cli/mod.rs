//! Command-line interface for flightdelay.
//!
//! This module provides the CLI structure for the `flightdelay` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    ConfigCommand, EstimateCommand, FrequentCommand, GenerateCommand, InfoCommand, OutputFormat,
    ReportCommand, SortKeyArg, SortedCommand, TopCommand,
};

/// flightdelay - Flight delay analytics
///
/// Ranks flights by delay, finds airlines that are frequently late, and
/// estimates delays from weather, traffic and technical risk scores.
#[derive(Debug, Parser)]
#[command(name = "flightdelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate sample flights and store them
    Generate(GenerateCommand),

    /// List flights ordered by a field
    Sorted(SortedCommand),

    /// Show the most delayed flights
    Top(TopCommand),

    /// Show airlines that are frequently more than 30 minutes late
    Frequent(FrequentCommand),

    /// Estimate the delay of one flight and score the estimate
    Estimate(EstimateCommand),

    /// Report estimator error and per-airline delay statistics
    Report(ReportCommand),

    /// Summarize the flight database
    Info(InfoCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "flightdelay");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["flightdelay", "-q", "info"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["flightdelay", "info"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["flightdelay", "-v", "info"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["flightdelay", "-vv", "info"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_generate() {
        let cli = parse(&["flightdelay", "generate", "-n", "5", "--realtime", "--seed", "3"]);
        match cli.command {
            Command::Generate(cmd) => {
                assert_eq!(cmd.count, Some(5));
                assert!(cmd.realtime);
                assert_eq!(cmd.seed, Some(3));
                assert!(!cmd.no_persist);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_sorted_defaults() {
        let cli = parse(&["flightdelay", "sorted"]);
        match cli.command {
            Command::Sorted(cmd) => {
                assert_eq!(cmd.key, SortKeyArg::Delay);
                assert!(!cmd.ascending);
                assert_eq!(cmd.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_top_negative_k() {
        let cli = parse(&["flightdelay", "top", "-k", "-2"]);
        match cli.command {
            Command::Top(cmd) => assert_eq!(cmd.k, Some(-2)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_frequent_json() {
        let cli = parse(&["flightdelay", "frequent", "--k", "4", "-f", "json"]);
        match cli.command {
            Command::Frequent(cmd) => {
                assert_eq!(cmd.k, Some(4));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_estimate_requires_id() {
        assert!(Cli::try_parse_from(["flightdelay", "estimate"]).is_err());
        let cli = parse(&["flightdelay", "estimate", "FL1004"]);
        assert!(matches!(cli.command, Command::Estimate(ref cmd) if cmd.id == "FL1004"));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["flightdelay", "-c", "/custom/config.toml", "report"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = parse(&["flightdelay", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
