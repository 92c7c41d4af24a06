//! Command-line argument types.

use crate::config::MAX_MISMATCH_DELAY_MS;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pairs", version, about = "Pairs memory game in the terminal")]
pub struct PairsCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one game. Enter slot numbers to turn cards, q to quit.
    Play {
        /// Fixed table layout
        #[arg(long)]
        seed: Option<u64>,
        /// How long a mismatched pair stays face up
        #[arg(long = "delay-ms", value_parser = clap::value_parser!(u64).range(0..=MAX_MISMATCH_DELAY_MS))]
        delay_ms: Option<u64>,
    },
    /// Print a shuffled table face up
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show resolved configuration and where each value came from
    Cfg,
}

/// Subcommand names, for the usage summary printed on parse errors.
pub const COMMANDS: &[&str] = &["play", "deal", "cfg"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_subcommand() {
        for args in [
            vec!["pairs", "cfg"],
            vec!["pairs", "deal"],
            vec!["pairs", "deal", "--seed", "3"],
            vec!["pairs", "play"],
            vec!["pairs", "play", "--seed", "1", "--delay-ms", "0"],
        ] {
            assert!(PairsCli::try_parse_from(&args).is_ok(), "{args:?}");
        }
        assert_eq!(COMMANDS.len(), 3);
    }

    #[test]
    fn delay_is_range_checked() {
        assert!(PairsCli::try_parse_from(["pairs", "play", "--delay-ms", "10000"]).is_ok());
        assert!(PairsCli::try_parse_from(["pairs", "play", "--delay-ms", "10001"]).is_err());
        assert!(PairsCli::try_parse_from(["pairs", "play", "--delay-ms", "-1"]).is_err());
    }
}
