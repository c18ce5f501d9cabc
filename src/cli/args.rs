// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Notes directory, overrides the config file
    #[arg(short, long, value_name = "STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Base URL of a notes API, overrides the config file
    #[arg(short, long, value_name = "REMOTE", global = true)]
    pub remote: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (new, show, edit or render)
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a note seeded with the default template
    New {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Notebook the note belongs to
        #[arg(long, value_name = "ID")]
        notebook: String,

        #[arg(long, default_value = "")]
        title: String,
    },

    /// Print a note summary
    Show {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Output note as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Replay an edit script through an autosaving session
    Edit {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Script file, one step per line
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },

    /// Write the HTML rendering of a note
    Render {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
