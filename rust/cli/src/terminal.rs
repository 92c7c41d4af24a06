//! Text rendering of the table.
//!
//! [`TerminalSurface`] keeps the face of every slot and redraws the whole
//! grid on demand; the game controller only ever pushes changes into it.

use pairs_engine::cards::CardId;
use pairs_engine::surface::{CardRef, Surface};
use std::io::{self, Write};

/// Cards per row. Four rows hold a full deck.
pub const COLUMNS: usize = 13;
const CELL_WIDTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Hidden,
    Up(CardId),
    Paired(CardId),
}

#[derive(Debug, Default)]
pub struct TerminalSurface {
    cells: Vec<Cell>,
    score: u32,
    tries: u32,
    /// Shown under the next redraw only.
    notice: Option<String>,
    completion: Option<(u32, u32)>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        let cells = &self.cells;
        write_grid(out, cells.len(), |slot| match cells[slot] {
            Cell::Hidden => "##".to_string(),
            Cell::Up(card) => card.to_string(),
            Cell::Paired(card) => format!("({card})"),
        })?;
        writeln!(out, "Score: {}  Tries: {}", self.score, self.tries)?;
        if let Some(notice) = self.notice.take() {
            writeln!(out, "{notice}")?;
        }
        if let Some((score, tries)) = self.completion {
            writeln!(
                out,
                "All pairs found! Final score {score} in {tries} tries."
            )?;
        }
        Ok(())
    }

    fn set(&mut self, card: CardRef, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(card.slot) {
            *slot = cell;
        }
    }
}

impl Surface for TerminalSurface {
    fn render_deck(&mut self, slots: usize) {
        self.cells = vec![Cell::Hidden; slots];
        self.notice = None;
        self.completion = None;
    }

    fn reveal(&mut self, card: CardRef) {
        self.set(card, Cell::Up(card.card));
    }

    fn conceal(&mut self, card: CardRef) {
        self.set(card, Cell::Hidden);
    }

    fn mark_paired(&mut self, cards: &[CardRef]) {
        for card in cards {
            self.set(*card, Cell::Paired(card.card));
        }
        self.notice = Some(format!("Pair: {}", join_labels(cards)));
    }

    fn play_mismatch_effect(&mut self, cards: &[CardRef]) {
        self.notice = Some(format!("No match: {}", join_labels(cards)));
    }

    fn render_score(&mut self, score: u32) {
        self.score = score;
    }

    fn render_try_count(&mut self, tries: u32) {
        self.tries = tries;
    }

    fn render_completion(&mut self, score: u32, tries: u32) {
        self.completion = Some((score, tries));
    }
}

/// Lay `len` cells out in rows of [`COLUMNS`], each row prefixed with the
/// 1-based number of its first slot.
pub fn write_grid(
    out: &mut dyn Write,
    len: usize,
    label: impl Fn(usize) -> String,
) -> io::Result<()> {
    for row_start in (0..len).step_by(COLUMNS) {
        write!(out, "{:>3} |", row_start + 1)?;
        for slot in row_start..(row_start + COLUMNS).min(len) {
            write!(out, "{:>width$}", label(slot), width = CELL_WIDTH)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn join_labels(cards: &[CardRef]) -> String {
    cards
        .iter()
        .map(|c| c.card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
