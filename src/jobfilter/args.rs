use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use jobfilter::registry::{CLASSIFIED, UNCLASSIFIED};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobfilter", version)]
#[command(about = "Filter CI jobs with query-string persisted filters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Query string holding the current filters (e.g. "filter-tier=3&author=bob")
    #[arg(short, long, global = true, default_value = "")]
    pub query: String,

    /// Config file (defaults to jobfilter.json in the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClassifiedArg {
    Classified,
    Unclassified,
}

impl ClassifiedArg {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassifiedArg::Classified => CLASSIFIED,
            ClassifiedArg::Unclassified => UNCLASSIFIED,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the jobs from a JSON file that pass the filters
    #[command(alias = "ls")]
    Show {
        /// JSON array of jobs
        jobs: PathBuf,

        /// Also list hidden jobs, marked as hidden
        #[arg(short, long)]
        all: bool,
    },

    /// Print the derived filter state as JSON
    State,

    /// List the active filters
    Filters,

    /// List the filterable fields
    Fields,

    /// Add a value to a filter
    Add { field: String, value: String },

    /// Remove a value from a filter, or the whole filter if no value is given
    #[command(alias = "rm")]
    Remove {
        field: String,
        value: Option<String>,
    },

    /// Overwrite a filter with exactly these values
    Replace {
        field: String,

        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },

    /// Add (or with --off remove) several values of one filter at once
    Toggle {
        field: String,

        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,

        /// Remove the values instead of adding them
        #[arg(long)]
        off: bool,
    },

    /// Toggle result statuses or groups (failures, nonfailures, in-progress)
    ToggleStatus {
        #[arg(required = true, num_args = 1..)]
        statuses: Vec<String>,
    },

    /// Toggle whether classified or unclassified failures are shown
    ToggleClassified {
        #[arg(value_enum)]
        state: ClassifiedArg,
    },

    /// Toggle showing only unclassified failures
    Unclassified,

    /// Show only superseded jobs
    Superseded,

    /// Remove every field filter, keeping statuses
    ClearFields,

    /// Reset result status and classified state to their defaults
    Reset,

    /// Remove every prefixed filter
    Clear,
}
