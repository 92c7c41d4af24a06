//! Presentation Surface contract.
//!
//! The controller drives a surface through these write-only calls and never
//! reads anything back. A surface owns the visual state of each card (face
//! up, face down, paired, shaking) and is free to render it however it likes:
//! a terminal grid, a stream of browser events, or a log for tests.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;

/// Handle to one card on the table: where it sits and what it is.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CardRef {
    pub slot: usize,
    pub card: CardId,
}

pub trait Surface {
    /// Lay out `slots` face-down cards. Identities are disclosed one card at a
    /// time through [`Surface::reveal`].
    fn render_deck(&mut self, slots: usize);

    fn reveal(&mut self, card: CardRef);

    fn conceal(&mut self, card: CardRef);

    /// Permanently mark cards as found.
    fn mark_paired(&mut self, cards: &[CardRef]);

    /// Transient, self-clearing cue on a failed pair attempt.
    fn play_mismatch_effect(&mut self, cards: &[CardRef]);

    fn render_score(&mut self, score: u32);

    fn render_try_count(&mut self, tries: u32);

    fn render_completion(&mut self, score: u32, tries: u32);
}

/// One call made against a [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceCommand {
    RenderDeck { slots: usize },
    Reveal { card: CardRef },
    Conceal { card: CardRef },
    MarkPaired { cards: Vec<CardRef> },
    MismatchEffect { cards: Vec<CardRef> },
    Score { score: u32 },
    TryCount { tries: u32 },
    Completion { score: u32, tries: u32 },
}

/// Surface that records every call in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Hand over everything recorded so far and start empty.
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn render_deck(&mut self, slots: usize) {
        self.commands.push(SurfaceCommand::RenderDeck { slots });
    }

    fn reveal(&mut self, card: CardRef) {
        self.commands.push(SurfaceCommand::Reveal { card });
    }

    fn conceal(&mut self, card: CardRef) {
        self.commands.push(SurfaceCommand::Conceal { card });
    }

    fn mark_paired(&mut self, cards: &[CardRef]) {
        self.commands.push(SurfaceCommand::MarkPaired {
            cards: cards.to_vec(),
        });
    }

    fn play_mismatch_effect(&mut self, cards: &[CardRef]) {
        self.commands.push(SurfaceCommand::MismatchEffect {
            cards: cards.to_vec(),
        });
    }

    fn render_score(&mut self, score: u32) {
        self.commands.push(SurfaceCommand::Score { score });
    }

    fn render_try_count(&mut self, tries: u32) {
        self.commands.push(SurfaceCommand::TryCount { tries });
    }

    fn render_completion(&mut self, score: u32, tries: u32) {
        self.commands
            .push(SurfaceCommand::Completion { score, tries });
    }
}
