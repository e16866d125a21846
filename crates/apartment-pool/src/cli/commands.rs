//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::{ApartmentId, Section};
use crate::query::{FloorSelection, StatusFilter};

/// Arguments for browsing floors.
#[derive(Debug, Args)]
pub struct FloorsCommand {
    /// Section to show (1-12)
    #[arg(short, long, default_value = "1")]
    pub section: Section,

    /// Floor number or "all"
    #[arg(short, long, default_value = "all")]
    pub floor: FloorSelection,

    /// Show only free or only sold apartments
    #[arg(long, value_enum, default_value = "all")]
    pub status: StatusArg,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for showing one apartment.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Apartment id, e.g. 1-5-3
    pub id: ApartmentId,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments for reserving an apartment.
#[derive(Debug, Args)]
pub struct ReserveCommand {
    /// Apartment id, e.g. 1-5-3
    pub id: ApartmentId,

    /// Buyer name; several words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

impl ReserveCommand {
    /// Buyer name as typed.
    #[must_use]
    pub fn buyer_name(&self) -> String {
        self.name.join(" ")
    }
}

/// Arguments for cancelling a reservation.
#[derive(Debug, Args)]
pub struct CancelCommand {
    /// Apartment id, e.g. 1-5-3
    pub id: ApartmentId,
}

/// Arguments for commands that only toggle JSON output.
#[derive(Debug, Args)]
pub struct JsonFlag {
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

/// Status filter argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusArg {
    /// Every apartment
    #[default]
    All,
    /// Neither sold nor reserved
    Free,
    /// Sold or reserved
    Sold,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Free => Self::Free,
            StatusArg::Sold => Self::Sold,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
