pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kitabak")]
#[command(about = "Track daily reading time against a goal", long_about = None)]
pub struct Cli {
    /// Reader to track (defaults to the configured user)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Path to the stats database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show today's reading progress
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the daily reading goal in minutes
    Goal {
        /// Whole minutes, 1 to 1440
        #[arg(allow_hyphen_values = true)]
        minutes: String,
    },
    /// Show the last opened book
    Resume {
        /// Open it as well
        #[arg(long)]
        open: bool,
    },
    /// Record a reading session measured elsewhere
    Record {
        /// Session length in seconds
        seconds: u64,

        /// URL or path of the book read
        #[arg(short, long)]
        book: Option<String>,

        /// Title of the book read
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Open a book and track reading time until quit
    Read {
        /// URL or path of the book
        book: String,

        /// Title to show and remember
        #[arg(short, long)]
        title: Option<String>,

        /// Don't open the book in the default viewer
        #[arg(long)]
        no_open: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goal_keeps_raw_input() {
        let cli = Cli::parse_from(["kitabak", "goal", "-5"]);
        match cli.command {
            Commands::Goal { minutes } => assert_eq!(minutes, "-5"),
            _ => panic!("expected goal command"),
        }
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from(["kitabak", "stats", "--json", "--user", "amal"]);
        assert_eq!(cli.user.as_deref(), Some("amal"));
        assert!(matches!(cli.command, Commands::Stats { json: true }));
    }

    #[test]
    fn test_parse_record() {
        let cli = Cli::parse_from([
            "kitabak", "record", "90", "--book", "https://example.com/a.pdf", "-t", "A",
        ]);
        match cli.command {
            Commands::Record {
                seconds,
                book,
                title,
            } => {
                assert_eq!(seconds, 90);
                assert_eq!(book.as_deref(), Some("https://example.com/a.pdf"));
                assert_eq!(title.as_deref(), Some("A"));
            }
            _ => panic!("expected record command"),
        }
    }
}
