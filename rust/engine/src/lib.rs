//! # pairs-engine: Card-Matching Game Core
//!
//! A deterministic engine for the classic pairs (memory) card game: 52 cards
//! are laid face down, the player turns two at a time, and cards of equal
//! rank stay up as a pair. Rendering is delegated to a [`surface::Surface`]
//! so the same controller drives a terminal, a browser, or a test recorder.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card identity, rank, suit, and the pair rule
//! - [`deck`] - Fisher–Yates shuffle and seeded table layouts
//! - [`surface`] - Presentation Surface contract and a recording surface
//! - [`game`] - Turn-taking state machine (reveal, match, mismatch, finish)
//! - [`errors`] - Error types for contract violations
//!
//! ## Quick Start
//!
//! ```rust
//! use pairs_engine::game::{Game, Selection};
//! use pairs_engine::surface::RecordingSurface;
//!
//! let mut surface = RecordingSurface::new();
//! let mut game = Game::with_seed(42);
//! game.start(&mut surface);
//!
//! game.select(0, &mut surface).unwrap();
//! match game.select(1, &mut surface).unwrap() {
//!     Selection::Mismatched { pending, .. } => {
//!         // Wait for `pending.delay()`, then turn the cards back.
//!         game.resolve_mismatch(pending, &mut surface);
//!     }
//!     other => println!("{:?}", other),
//! }
//! assert_eq!(game.tries(), 1);
//! ```
//!
//! ## Deterministic Layouts
//!
//! ```rust
//! use pairs_engine::deck::Deck;
//!
//! let a = Deck::new_with_seed(7);
//! let b = Deck::new_with_seed(7);
//! assert_eq!(a.order(), b.order());
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod surface;

pub use cards::{CardId, Rank, Suit};
pub use deck::Deck;
pub use errors::GameError;
pub use game::{CardFace, Game, IgnoreReason, PendingConceal, Phase, Resolution, Selection};
pub use surface::{CardRef, RecordingSurface, Surface};
