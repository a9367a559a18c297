//! Command-line argument parsing for filingqa
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// filingqa - Citation-tagged question answering over long filings
#[derive(Parser, Debug)]
#[command(name = "filingqa")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Index long filings and answer questions with page-level citations", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -v (debug), -vv (trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment documents, embed chunks and persist the index
    Index {
        /// Document directory (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Answer a batch of questions from a JSON file
    Ask {
        /// Questions file (overrides config)
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Answers file (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Answer a single question
    Query {
        /// Question text
        #[arg(value_name = "QUESTION")]
        question: String,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Default log filter when RUST_LOG is unset
    pub fn filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_quiet() {
        let args = parse(&["filingqa", "-q", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
        assert_eq!(args.verbosity().filter(), "warn");
    }

    #[test]
    fn test_verbosity_normal() {
        let args = parse(&["filingqa", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["filingqa", "-v", "config"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["filingqa", "-vv", "index"]).verbosity(), Verbosity::VeryVerbose);
        assert_eq!(Verbosity::VeryVerbose.filter(), "trace");
    }

    #[test]
    fn test_ask_overrides() {
        let args = parse(&["filingqa", "ask", "--questions", "q.json", "--output", "out/a.json"]);
        match args.command {
            Commands::Ask { questions, output } => {
                assert_eq!(questions, Some(PathBuf::from("q.json")));
                assert_eq!(output, Some(PathBuf::from("out/a.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_query_requires_question() {
        assert!(Args::try_parse_from(["filingqa", "query"]).is_err());

        let args = parse(&["filingqa", "--config", "c.toml", "query", "What was revenue?"]);
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(args.command, Commands::Query { ref question } if question == "What was revenue?"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["filingqa"]).is_err());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
    }
}
