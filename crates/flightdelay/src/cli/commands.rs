//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::analytics::{SortDirection, SortKey};

/// Generate command arguments.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Number of flights to generate (defaults to the configured batch size)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Simulate a live feed of upcoming departures
    #[arg(long)]
    pub realtime: bool,

    /// Seed for reproducible data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep generated flights in memory only
    #[arg(long)]
    pub no_persist: bool,
}

/// Sorted command arguments.
#[derive(Debug, Args)]
pub struct SortedCommand {
    /// Field to sort by
    #[arg(short, long, value_enum, default_value = "delay")]
    pub key: SortKeyArg,

    /// Sort smallest first instead of largest first
    #[arg(short, long)]
    pub ascending: bool,

    /// Maximum number of rows to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl SortedCommand {
    /// Requested sort direction.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        if self.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

/// Top delays command arguments.
#[derive(Debug, Args)]
pub struct TopCommand {
    /// Number of flights to show
    #[arg(short, long, allow_negative_numbers = true)]
    pub k: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Frequent delayed airlines command arguments.
#[derive(Debug, Args)]
pub struct FrequentCommand {
    /// Misra-Gries parameter: airlines above 1/k of high delays are reported
    #[arg(short, long, allow_negative_numbers = true)]
    pub k: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Estimate command arguments.
#[derive(Debug, Args)]
pub struct EstimateCommand {
    /// Flight identifier
    pub id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Info command arguments.
#[derive(Debug, Args)]
pub struct InfoCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Sort key argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKeyArg {
    /// Observed delay
    Delay,
    /// Weather risk score
    Weather,
    /// Traffic risk score
    Traffic,
    /// Technical risk score
    Technical,
    /// Scheduled departure time
    Scheduled,
}

impl From<SortKeyArg> for SortKey {
    fn from(arg: SortKeyArg) -> Self {
        match arg {
            SortKeyArg::Delay => Self::ActualDelay,
            SortKeyArg::Weather => Self::WeatherScore,
            SortKeyArg::Traffic => Self::TrafficScore,
            SortKeyArg::Technical => Self::TechnicalScore,
            SortKeyArg::Scheduled => Self::ScheduledTime,
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table
    #[default]
    Table,
    /// JSON array
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_arg_conversion() {
        assert_eq!(SortKey::from(SortKeyArg::Delay), SortKey::ActualDelay);
        assert_eq!(SortKey::from(SortKeyArg::Scheduled), SortKey::ScheduledTime);
        assert_eq!(SortKey::from(SortKeyArg::Technical), SortKey::TechnicalScore);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_sorted_direction() {
        let cmd = SortedCommand {
            key: SortKeyArg::Delay,
            ascending: true,
            limit: None,
            format: OutputFormat::Table,
        };
        assert_eq!(cmd.direction(), SortDirection::Ascending);
    }
}
