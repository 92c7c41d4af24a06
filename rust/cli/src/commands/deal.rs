//! `pairs deal`: print a shuffled table face up.

use crate::config;
use crate::error::CliError;
use crate::terminal::write_grid;
use pairs_engine::deck::Deck;
use std::io::Write;

/// Shuffle a table and print it as a 4x13 grid of card glyphs.
///
/// The seed comes from `--seed`, then configuration, then the OS RNG, and is
/// printed first so the layout can be replayed with `pairs play --seed`.
pub fn handle_deal_command(seed: Option<u64>, out: &mut dyn Write) -> Result<(), CliError> {
    let seed = match seed {
        Some(seed) => seed,
        None => config::load_with_sources()?
            .config
            .seed
            .unwrap_or_else(rand::random),
    };
    let deck = Deck::new_with_seed(seed);

    writeln!(out, "Seed: {}", seed)?;
    write_grid(out, deck.len(), |slot| {
        deck.card_at(slot)
            .map(|card| card.to_string())
            .unwrap_or_default()
    })?;
    Ok(())
}
