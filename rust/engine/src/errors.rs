use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown card identity: {id} (expected 0..52)")]
    UnknownCard { id: u8 },
    #[error("Unknown slot: {slot} (table has {len} slots)")]
    UnknownSlot { slot: usize, len: usize },
    #[error("Invalid deck: {0}")]
    InvalidDeck(String),
}
