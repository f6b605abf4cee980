use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate and adopt a new habit plan (replaces any current plan)
    ///
    /// Example: habit new --goal "Run daily" --reason "10k in spring" --time 7am
    /// Example: habit new --goal "Run daily" --reason "10k" --time 7am --from plan.json
    New {
        #[arg(long)]
        goal: String,
        #[arg(long)]
        reason: String,
        /// Preferred time of day for the habit
        #[arg(long = "time")]
        preferred_time: String,
        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
        /// Plan length in days: 7, 14 or 30
        #[arg(long, default_value_t = 7)]
        duration: u32,
        /// Extra context passed to the generator
        #[arg(long)]
        context: Option<String>,
        /// Import raw plan content from a JSON file instead of calling the API
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
    /// Show the plan overview, or one day in detail
    ///
    /// Example: habit show
    /// Example: habit show 3
    Show {
        day: Option<u32>,
    },
    /// List parts of the plan
    ///
    /// Example: habit list tasks
    List {
        #[command(subcommand)]
        list: ListCommand,
    },
    /// Mark a day's task as completed
    ///
    /// Example: habit done 3
    Done {
        day: u32,
    },
    /// Attach reflection notes to a day's task
    ///
    /// Example: habit note 3 "Felt easier than yesterday"
    Note {
        day: u32,
        text: String,
    },
    /// Move the viewing cursor to a day
    ///
    /// Example: habit day 4
    Day {
        day: u32,
    },
    /// Show streaks, consistency and habit strength
    ///
    /// Example: habit progress
    Progress,
    /// Export the plan as a markdown document
    ///
    /// Example: habit export --output my-plan.md
    Export {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Discard the current plan and reset the session
    ///
    /// Example: habit discard
    Discard,
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// List all daily tasks
    Tasks,
    /// List weekly checkpoints
    Checkpoints,
    /// List motivational messages
    Messages,
}
