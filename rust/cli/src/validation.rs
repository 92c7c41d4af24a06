//! Parsing of interactive input.

/// What the player typed at the slot prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum SlotInput {
    /// Zero-based slot on the table.
    Slot(usize),
    /// `q` or `quit`
    Quit,
    Invalid(String),
}

/// Parse a 1-based slot number (as printed on the grid) or a quit command.
///
/// # Example
///
/// ```rust
/// # use pairs_cli::validation::{parse_slot_input, SlotInput};
/// assert_eq!(parse_slot_input("1", 52), SlotInput::Slot(0));
/// assert_eq!(parse_slot_input("52", 52), SlotInput::Slot(51));
/// assert_eq!(parse_slot_input("QUIT", 52), SlotInput::Quit);
/// assert!(matches!(parse_slot_input("53", 52), SlotInput::Invalid(_)));
/// ```
pub fn parse_slot_input(input: &str, slots: usize) -> SlotInput {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return SlotInput::Invalid("Empty input".to_string());
    }
    if input == "q" || input == "quit" {
        return SlotInput::Quit;
    }

    match input.parse::<usize>() {
        Ok(n) if (1..=slots).contains(&n) => SlotInput::Slot(n - 1),
        Ok(n) => SlotInput::Invalid(format!("Slot {} is off the table (1-{})", n, slots)),
        Err(_) => SlotInput::Invalid(format!(
            "Unrecognized input '{}'. Enter a slot number (1-{}) or q to quit",
            input, slots
        )),
    }
}
