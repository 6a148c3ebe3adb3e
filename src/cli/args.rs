//! Command-line argument parsing for channelmix
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::attribution::AttributionRule;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// channelmix - Attribution summaries and budget allocation from marketing-mix model outputs
#[derive(Parser, Debug)]
#[command(name = "channelmix")]
#[command(version)]
#[command(about = "Summarize channel attribution and reallocate marketing budget", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the result)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate a model fit into per-channel performance
    Aggregate {
        /// Model fit JSON file
        #[arg(value_name = "FIT")]
        fit: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Split the fit's total contribution across a journey with a positional rule
    Attribute {
        /// Model fit JSON file
        #[arg(value_name = "FIT")]
        fit: PathBuf,

        /// first_touch, last_touch, linear or position_weighted
        #[arg(short, long, default_value = "linear")]
        rule: AttributionRule,

        /// Comma-separated touchpoint order (default: report.default_channels order)
        #[arg(long, value_delimiter = ',')]
        journey: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Allocate a total budget across the channels of a model fit
    Allocate {
        /// Model fit JSON file
        #[arg(value_name = "FIT")]
        fit: PathBuf,

        /// Total budget to distribute
        #[arg(short, long)]
        budget: f64,

        /// JSON file mapping channel to {"min": .., "max": ..}
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Fall back to an equal split when no channel has positive ROI
        #[arg(long)]
        fallback_equal: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Build a full report, optionally with a budget allocation
    Report {
        /// Model fit JSON file
        #[arg(value_name = "FIT")]
        fit: PathBuf,

        /// Total budget to distribute
        #[arg(short, long)]
        budget: Option<f64>,

        /// JSON file mapping channel to {"min": .., "max": ..}
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Write the JSON report here instead of printing text
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a seeded synthetic model fit from a marketing dataset
    Simulate {
        /// Dataset JSON file (records with date, target and channel spend)
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Write the fit here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
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

    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        let budget = match &self.command {
            Commands::Allocate { budget, .. } => Some(*budget),
            Commands::Report { budget, .. } => *budget,
            _ => None,
        };
        if let Some(budget) = budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(format!("Budget must be a positive number, got {}", budget));
            }
        }

        if let Commands::Report {
            budget: None,
            constraints: Some(_),
            ..
        } = &self.command
        {
            return Err("--constraints requires --budget.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Parse a configured default verbosity
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" => Some(Verbosity::VeryVerbose),
            _ => None,
        }
    }

    /// Check if should show detailed events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }

    /// Default tracing filter directive for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "channelmix=error",
            Verbosity::Normal => "channelmix=warn",
            Verbosity::Verbose => "channelmix=info",
            Verbosity::VeryVerbose => "channelmix=debug",
        }
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
        let args = parse(&["channelmix", "-q", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        let args = parse(&["channelmix", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let args = parse(&["channelmix", "aggregate", "fit.json", "-v"]);
        assert_eq!(args.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_very_verbose() {
        let args = parse(&["channelmix", "-vv", "config"]);
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_allocate_args() {
        let args = parse(&[
            "channelmix",
            "allocate",
            "fit.json",
            "--budget",
            "100000",
            "--constraints",
            "bounds.json",
            "--fallback-equal",
        ]);
        match &args.command {
            Commands::Allocate {
                budget,
                constraints,
                fallback_equal,
                json,
                ..
            } => {
                assert_eq!(*budget, 100000.0);
                assert_eq!(constraints.as_deref(), Some(std::path::Path::new("bounds.json")));
                assert!(*fallback_equal);
                assert!(!*json);
            }
            other => panic!("Expected Allocate, got {:?}", other),
        }
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_attribute_args() {
        let args = parse(&[
            "channelmix",
            "attribute",
            "fit.json",
            "--rule",
            "position_weighted",
            "--journey",
            "social,email,search",
        ]);
        match &args.command {
            Commands::Attribute { rule, journey, .. } => {
                assert_eq!(*rule, AttributionRule::PositionWeighted);
                assert_eq!(journey, &vec!["social", "email", "search"]);
            }
            other => panic!("Expected Attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_attribute_defaults_and_bad_rule() {
        let args = parse(&["channelmix", "attribute", "fit.json"]);
        match &args.command {
            Commands::Attribute { rule, journey, .. } => {
                assert_eq!(*rule, AttributionRule::Linear);
                assert!(journey.is_empty());
            }
            other => panic!("Expected Attribute, got {:?}", other),
        }

        assert!(Args::try_parse_from(["channelmix", "attribute", "fit.json", "-r", "shapley"]).is_err());
    }

    #[test]
    fn test_simulate_default_seed() {
        let args = parse(&["channelmix", "simulate", "data.json"]);
        assert!(matches!(args.command, Commands::Simulate { seed: 42, .. }));
    }

    #[test]
    fn test_validate_rejects_non_positive_budget() {
        let args = parse(&["channelmix", "allocate", "fit.json", "--budget", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_constraints_need_budget() {
        let args = parse(&["channelmix", "report", "fit.json", "--constraints", "b.json"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Args::try_parse_from(["channelmix"]).is_err());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Normal.show_events());
        assert!(Verbosity::Verbose.show_events());
        assert_eq!(Verbosity::VeryVerbose.log_filter(), "channelmix=debug");
        assert_eq!(Verbosity::from_config("verbose"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::from_config(Verbosity::Quiet.as_str()), Some(Verbosity::Quiet));
        assert_eq!(Verbosity::from_config("loud"), None);
    }
}
