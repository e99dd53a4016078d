//! CLI command definitions and subcommands

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

/// TripPlanner - AI trip planning from the terminal
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Plan trips with AI-generated day-by-day itineraries",
    version = env!("CARGO_PKG_VERSION"),
    after_help = after_help(),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate an itinerary for a destination
    Plan {
        /// Destination, e.g. "Tokyo, Japan"
        destination: String,

        /// Trip length in days
        #[arg(short, long, default_value = "3")]
        days: NonZeroU32,

        /// Travel style (adventure, relaxed, food, ...)
        #[arg(short, long, default_value = "any")]
        style: String,

        /// Who is travelling (solo, couple, family, ...)
        #[arg(long, default_value = "any")]
        companions: String,

        /// Save the trip for the signed-in user
        #[arg(long)]
        save: bool,
    },

    /// Suggest destinations matching some text
    Suggest {
        /// Partial destination name
        text: String,
    },

    /// Sign in (password is read from stdin)
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
    },

    /// Sign out
    Logout,

    /// Show who is signed in
    Whoami,

    /// Manage saved trips
    Trips {
        #[command(subcommand)]
        command: TripsCommand,
    },
}

/// Saved trip subcommands
#[derive(Debug, Subcommand)]
pub enum TripsCommand {
    /// List saved trips, newest first
    List {
        /// Only trips whose destination contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one trip with its itinerary
    Show {
        /// Trip id
        id: String,
    },

    /// Replace a trip's notes
    Notes {
        /// Trip id
        id: String,

        /// New notes
        notes: String,
    },

    /// Delete a trip
    Delete {
        /// Trip id
        id: String,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log")
}

fn after_help() -> String {
    format!("Logs are written to: {}", get_log_path().display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_defaults() {
        let cli = Cli::parse_from(["tp", "plan", "Tokyo, Japan"]);
        match cli.command {
            Command::Plan {
                destination,
                days,
                style,
                companions,
                save,
            } => {
                assert_eq!(destination, "Tokyo, Japan");
                assert_eq!(days.get(), 3);
                assert_eq!(style, "any");
                assert_eq!(companions, "any");
                assert!(!save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_days_rejected() {
        assert!(Cli::try_parse_from(["tp", "plan", "Rome", "--days", "0"]).is_err());
    }

    #[test]
    fn test_trips_notes() {
        let cli = Cli::parse_from(["tp", "-l", "debug", "trips", "notes", "abc", "book tickets"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Command::Trips {
                command: TripsCommand::Notes { .. }
            }
        ));
    }
}
