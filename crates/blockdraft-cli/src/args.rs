//! Command-line argument definitions for the Blockdraft CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options control configuration file selection, the
//! data directory, and logging verbosity; the subcommand selects the
//! operation.

use clap::{Parser, Subcommand};

use blockdraft::{export::ExportFormat, model::DiagramId};

/// Command-line arguments for the Blockdraft diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding stored diagrams, overrides the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a diagram from a product description and store it
    Generate {
        description: String,

        #[arg(long)]
        title: Option<String>,
    },

    /// List stored diagrams, newest first
    List,

    /// Print the structured dump of a stored diagram
    Show { id: DiagramId },

    /// Apply a JSON update payload from a file
    Update { id: DiagramId, payload: String },

    /// Delete a stored diagram
    Delete { id: DiagramId },

    /// Export a stored diagram
    Export {
        id: DiagramId,

        /// json, svg, or drawio
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output path, defaults to the suggested file name
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Bind section-level connections to the first block of each section
    Rebase { id: DiagramId },

    /// Replay a JSON array of canvas events against a stored diagram
    Replay { id: DiagramId, events: String },
}
