//! CLI module for language-learning.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{mask_secret, Output};

use clap::{Parser, Subcommand};

/// Language Learning - LingQ lessons from your own vocabulary
///
/// Fetches your LingQ vocabulary, has an LLM write a story with the words you
/// know, reads it aloud with text-to-speech and imports the result as a lesson.
#[derive(Parser, Debug)]
#[command(name = "language-learning")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a story lesson and import it into LingQ
    Run {
        /// Load the story from a JSON file instead of generating one
        #[arg(long)]
        story_file: Option<String>,

        /// Ignore the vocabulary cache and refetch from LingQ
        #[arg(short, long)]
        refresh: bool,

        /// Lowest familiarity level to include in the story (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        min_familiarity: Option<u8>,

        /// Write the output files but do not import the lesson
        #[arg(long)]
        no_import: bool,

        /// Directory for output.json, output.txt, output.png and output.mp3
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Show how many words you have at each familiarity level
    Vocab {
        /// Ignore the vocabulary cache and refetch from LingQ
        #[arg(short, long)]
        refresh: bool,
    },

    /// Check configuration and API keys
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (API keys are masked)
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "language-learning",
            "-vv",
            "run",
            "--refresh",
            "--min-familiarity",
            "4",
            "--no-import",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                refresh,
                min_familiarity,
                no_import,
                ..
            } => {
                assert!(refresh);
                assert_eq!(min_familiarity, Some(4));
                assert!(no_import);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_min_familiarity_range() {
        assert!(Cli::try_parse_from(["language-learning", "run", "-m", "0"]).is_err());
        assert!(Cli::try_parse_from(["language-learning", "run", "-m", "6"]).is_err());
    }
}
