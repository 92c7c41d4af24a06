//! # Play Command
//!
//! One game of pairs in the terminal. The player types the 1-based slot
//! number shown at the start of each grid row plus the column offset; `q`
//! or end of input leaves the game.
//!
//! A mismatched pair is drawn face up, the command sleeps for the mismatch
//! delay, then both cards are turned back and the grid is redrawn. Picks the
//! game does not accept (a card already up or paired) change nothing and
//! are not reported.

use crate::config;
use crate::error::CliError;
use crate::io_utils::read_stdin_line;
use crate::terminal::TerminalSurface;
use crate::ui;
use crate::validation::{SlotInput, parse_slot_input};
use pairs_engine::deck::Deck;
use pairs_engine::game::Game;
use std::io::{BufRead, Write};
use std::time::Duration;

/// Handle the play command.
///
/// # Arguments
///
/// * `seed` - Table layout seed (default: configuration, then random)
/// * `delay_ms` - Mismatch delay (default: configuration, 1000 ms)
/// * `out` - Grid and prompts
/// * `err` - Input errors
/// * `stdin` - One slot number or `q` per line
pub fn handle_play_command(
    seed: Option<u64>,
    delay_ms: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let resolved = config::load_with_sources()?;
    let seed = seed
        .or(resolved.config.seed)
        .unwrap_or_else(rand::random);
    let delay_ms = delay_ms.unwrap_or(resolved.config.mismatch_delay_ms);

    writeln!(out, "pairs: seed={} delay_ms={}", seed, delay_ms)?;
    let mut game = Game::new(Deck::new_with_seed(seed))
        .with_mismatch_delay(Duration::from_millis(delay_ms));

    play_game(&mut game, out, err, stdin)?;

    if game.is_finished() {
        writeln!(out, "Game complete.")?;
    } else {
        writeln!(
            out,
            "Game left with {} of {} pairs found after {} tries.",
            game.pairs_found(),
            game.pairs_found() + game.pairs_remaining(),
            game.tries()
        )?;
    }
    Ok(())
}

fn play_game(
    game: &mut Game,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let slots = game.deck().len();
    let mut surface = TerminalSurface::new();
    game.start(&mut surface);
    surface.draw(out)?;

    while !game.is_finished() {
        write!(out, "Pick a card (1-{}, q to quit): ", slots)?;
        out.flush()?;

        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            break;
        };

        let slot = match parse_slot_input(&line, slots) {
            SlotInput::Slot(slot) => slot,
            SlotInput::Quit => {
                writeln!(out)?;
                break;
            }
            SlotInput::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
        };

        let selection = game.select(slot, &mut surface)?;
        if selection.is_ignored() {
            continue;
        }
        surface.draw(out)?;

        if let Some(pending) = selection.pending() {
            std::thread::sleep(pending.delay());
            game.resolve_mismatch(pending, &mut surface);
            surface.draw(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairs_engine::cards::is_pair;
    use serial_test::serial;
    use std::io::Cursor;

    fn clear_env() {
        unsafe {
            std::env::remove_var(config::CONFIG_ENV);
            std::env::remove_var(config::SEED_ENV);
            std::env::remove_var(config::DELAY_ENV);
        }
    }

    fn run_play(seed: u64, input: &str) -> (Result<(), CliError>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let result = handle_play_command(Some(seed), Some(0), &mut out, &mut err, &mut stdin);
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    /// Input that clears the table for `seed` with one try per pair.
    fn perfect_game(seed: u64) -> String {
        let deck = Deck::new_with_seed(seed);
        let mut used = [false; 52];
        let mut input = String::new();
        for a in 0..52 {
            if used[a] {
                continue;
            }
            let b = (a + 1..52)
                .find(|&b| !used[b] && is_pair(deck.card_at(a).unwrap(), deck.card_at(b).unwrap()))
                .unwrap();
            used[a] = true;
            used[b] = true;
            input.push_str(&format!("{}\n{}\n", a + 1, b + 1));
        }
        input
    }

    #[test]
    #[serial]
    fn quit_immediately_reports_progress() {
        clear_env();
        let (result, out, err) = run_play(42, "q\n");
        assert!(result.is_ok());
        assert!(out.contains("pairs: seed=42 delay_ms=0"));
        assert!(out.contains("Game left with 0 of 26 pairs found after 0 tries."));
        assert!(err.is_empty());
    }

    #[test]
    #[serial]
    fn eof_ends_the_game_cleanly() {
        clear_env();
        let (result, out, _) = run_play(42, "");
        assert!(result.is_ok());
        assert!(out.contains("Game left with"));
    }

    #[test]
    #[serial]
    fn bad_input_is_reported_and_skipped() {
        clear_env();
        let (result, out, err) = run_play(3, "zero\n53\n1\n1\nq\n");
        assert!(result.is_ok());
        assert!(err.contains("Unrecognized input 'zero'"));
        assert!(err.contains("Slot 53 is off the table"));
        // The repeated pick of slot 1 is ignored: no try is counted.
        assert!(out.contains("after 0 tries"));
    }

    #[test]
    #[serial]
    fn mismatch_turns_cards_back() {
        clear_env();
        let deck = Deck::new_with_seed(8);
        let other = (1..52)
            .find(|&s| !is_pair(deck.card_at(0).unwrap(), deck.card_at(s).unwrap()))
            .unwrap();
        let (result, out, _) = run_play(8, &format!("1\n{}\nq\n", other + 1));
        assert!(result.is_ok());
        assert!(out.contains("No match:"));
        assert!(out.contains("after 1 tries"));

        // The last grid before leaving is fully face down again.
        let last_grid = out.rsplit("Score:").nth(1).unwrap();
        let tail: Vec<&str> = last_grid.lines().rev().take(4).collect();
        assert_eq!(tail.iter().map(|l| l.matches("##").count()).sum::<usize>(), 52);
    }

    #[test]
    #[serial]
    fn perfect_game_finishes_with_full_score() {
        clear_env();
        let (result, out, _) = run_play(2024, &perfect_game(2024));
        assert!(result.is_ok());
        assert!(out.contains("All pairs found! Final score 260 in 26 tries."));
        assert!(out.contains("Game complete."));
    }

    #[test]
    #[serial]
    fn configuration_supplies_seed_and_delay() {
        clear_env();
        unsafe {
            std::env::set_var(config::SEED_ENV, "5");
            std::env::set_var(config::DELAY_ENV, "0");
        }
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut stdin = Cursor::new(b"q\n".to_vec());
        let result = handle_play_command(None, None, &mut out, &mut err, &mut stdin);
        clear_env();

        assert!(result.is_ok());
        assert!(String::from_utf8(out).unwrap().contains("seed=5 delay_ms=0"));
    }
}
