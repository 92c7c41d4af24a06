use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Number of cards on the table.
pub const DECK_SIZE: usize = 52;

/// Number of ranks per suit. Card identities repeat their rank every `RANKS_PER_SUIT` ids.
pub const RANKS_PER_SUIT: u8 = 13;

/// One of the four suits. The discriminant is `identity / 13`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    /// Spades (♠), identities 0..13
    Spades,
    /// Hearts (♥), identities 13..26
    Hearts,
    /// Diamonds (♦), identities 26..39
    Diamonds,
    /// Clubs (♣), identities 39..52
    Clubs,
}

impl Suit {
    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }

    fn from_index(index: u8) -> Suit {
        match index {
            0 => Suit::Spades,
            1 => Suit::Hearts,
            2 => Suit::Diamonds,
            _ => Suit::Clubs,
        }
    }
}

/// Face value of a card, Ace (1) through King (13).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// Ace (1)
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    /// Jack (11)
    Jack,
    /// Queen (12)
    Queen,
    /// King (13)
    King,
}

impl Rank {
    /// Numeric value, 1 for Ace through 13 for King.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Display glyph: `A`, `2`..`10`, `J`, `Q`, `K`.
    pub fn glyph(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    fn from_value(v: u8) -> Rank {
        match v {
            1 => Rank::Ace,
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            _ => Rank::King,
        }
    }
}

/// Card identity: an integer in `[0, 52)` encoding both rank and suit.
///
/// Identities are unique within a deck, so they double as a stable name for a
/// physical card. On the wire a `CardId` is a bare integer and is validated on
/// deserialization.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CardId(u8);

impl CardId {
    pub fn new(id: u8) -> Result<Self, GameError> {
        if usize::from(id) < DECK_SIZE {
            Ok(CardId(id))
        } else {
            Err(GameError::UnknownCard { id })
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn rank(self) -> Rank {
        Rank::from_value(self.0 % RANKS_PER_SUIT + 1)
    }

    pub fn suit(self) -> Suit {
        Suit::from_index(self.0 / RANKS_PER_SUIT)
    }
}

impl TryFrom<u8> for CardId {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CardId::new(value)
    }
}

impl From<CardId> for u8 {
    fn from(card: CardId) -> u8 {
        card.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank().glyph(), self.suit().symbol())
    }
}

/// Two cards form a pair iff their ranks are equal; suit is ignored.
pub fn is_pair(a: CardId, b: CardId) -> bool {
    a.0 % RANKS_PER_SUIT == b.0 % RANKS_PER_SUIT
}

/// All 52 identities in ascending order.
pub fn full_deck() -> Vec<CardId> {
    (0..DECK_SIZE as u8).map(CardId).collect()
}
