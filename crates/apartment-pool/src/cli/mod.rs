//! Command-line interface for apartment-pool.
//!
//! Argument definitions for the `aptpool` binary and the text renderers it
//! prints with.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CancelCommand, ConfigCommand, FloorsCommand, JsonFlag, OutputFormat, ReserveCommand,
    ShowCommand, StatusArg,
};

use crate::logging::Verbosity;

/// aptpool - Browse apartments and keep local reservations
///
/// Lists the sections and floors of the building, shows which apartments are
/// still free, and records reservations in a local database.
#[derive(Debug, Parser)]
#[command(name = "aptpool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
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
    /// List sections with their capacity and availability
    Sections(JsonFlag),

    /// Browse the floors of a section
    Floors(FloorsCommand),

    /// Show one apartment
    Show(ShowCommand),

    /// Reserve a free apartment
    Reserve(ReserveCommand),

    /// Cancel a reservation
    Cancel(CancelCommand),

    /// List local reservations
    Reservations(JsonFlag),

    /// Show building-wide counts
    Stats(JsonFlag),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FloorSelection;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "aptpool");
    }

    #[test]
    fn test_parse_floors_defaults() {
        let cli = Cli::try_parse_from(["aptpool", "floors"]).unwrap();
        let Command::Floors(cmd) = cli.command else {
            panic!("expected floors command");
        };
        assert_eq!(cmd.section.number(), 1);
        assert_eq!(cmd.floor, FloorSelection::All);
        assert_eq!(cmd.status, StatusArg::All);
        assert_eq!(cmd.format, OutputFormat::Plain);
    }

    #[test]
    fn test_parse_floors_filters() {
        let cli = Cli::try_parse_from([
            "aptpool", "floors", "-s", "4", "-f", "7", "--status", "free", "--format", "json",
        ])
        .unwrap();
        let Command::Floors(cmd) = cli.command else {
            panic!("expected floors command");
        };
        assert_eq!(cmd.section.number(), 4);
        assert_eq!(cmd.floor, FloorSelection::Floor(7));
        assert_eq!(cmd.status, StatusArg::Free);
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_rejects_bad_section() {
        assert!(Cli::try_parse_from(["aptpool", "floors", "-s", "13"]).is_err());
        assert!(Cli::try_parse_from(["aptpool", "floors", "-f", "top"]).is_err());
    }

    #[test]
    fn test_parse_reserve_multiword_name() {
        let cli = Cli::try_parse_from(["aptpool", "reserve", "1-5-3", "Анна", "Петрова"]).unwrap();
        let Command::Reserve(cmd) = cli.command else {
            panic!("expected reserve command");
        };
        assert_eq!(cmd.id.to_string(), "1-5-3");
        assert_eq!(cmd.buyer_name(), "Анна Петрова");
    }

    #[test]
    fn test_parse_reserve_requires_name() {
        assert!(Cli::try_parse_from(["aptpool", "reserve", "1-5-3"]).is_err());
    }

    #[test]
    fn test_parse_show_rejects_bad_id() {
        assert!(Cli::try_parse_from(["aptpool", "show", "1-5"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["aptpool", "-c", "/custom/config.toml", "stats"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["aptpool", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);

        let cli = Cli::try_parse_from(["aptpool", "-q", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }
}
