//! # Pairs CLI Library
//!
//! Terminal front-end for the pairs memory game.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments, dispatches to a subcommand handler, and returns
//! the process exit code. Output streams are injected so tests can capture
//! them.
//!
//! ```
//! use std::io;
//! let args = vec!["pairs", "deal", "--seed", "42"];
//! let code = pairs_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Play one game, reading slot numbers from stdin
//! - `deal`: Print a shuffled table face up
//! - `cfg`: Display resolved configuration and value sources

use clap::Parser;
use std::io::{BufRead, Write};

pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod terminal;
pub mod ui;
pub mod validation;

use cli::{COMMANDS, Commands, PairsCli};
use commands::{handle_cfg_command, handle_deal_command, handle_play_command};

pub use error::CliError;

/// Run the CLI with stdin as the play input.
///
/// Exit code: `0` for success (including a game left early), `2` for errors.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with_input(args, out, err, &mut stdin_lock)
}

/// [`run`] with an explicit input stream for `play`.
pub fn run_with_input<I, S>(
    args: I,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PairsCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_usage(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Play { seed, delay_ms } => handle_play_command(seed, delay_ms, out, err, stdin),
        Commands::Deal { seed } => handle_deal_command(seed, out),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        // cfg has already explained itself on stderr
        Err(CliError::Config(_)) if matches!(cli.cmd, Commands::Cfg) => exit_code::ERROR,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn report_usage(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version go to stdout and succeed
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }

    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Pairs CLI");
    let _ = writeln!(err, "Usage: pairs <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: pairs --help");
    exit_code::ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_captured(args: &[&str], input: &str) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let code = run_with_input(args, &mut out, &mut err, &mut stdin);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, out, err) = run_captured(&["pairs", "--help"], "");
        assert_eq!(code, 0);
        assert!(out.contains("play"));
        assert!(err.is_empty());
    }

    #[test]
    fn unknown_command_lists_commands() {
        let (code, out, err) = run_captured(&["pairs", "shuffle"], "");
        assert_eq!(code, 2);
        assert!(out.is_empty());
        for c in COMMANDS {
            assert!(err.contains(&format!("  {c}")), "missing {c}");
        }
    }

    #[test]
    fn deal_dispatches() {
        let (code, out, _) = run_captured(&["pairs", "deal", "--seed", "1"], "");
        assert_eq!(code, 0);
        assert!(out.starts_with("Seed: 1\n"));
    }
}
