//! Command handlers, one module per subcommand.
//!
//! Each handler takes its parsed arguments plus injected output streams and
//! returns `Result<(), CliError>`; [`crate::run`] turns that into an exit code.

pub mod cfg;
pub mod deal;
pub mod play;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use play::handle_play_command;
