//! Process exit codes returned by [`crate::run`].

/// Command completed, including a game the player quit early.
pub const SUCCESS: i32 = 0;

/// Bad arguments, bad configuration, or an I/O failure.
pub const ERROR: i32 = 2;
