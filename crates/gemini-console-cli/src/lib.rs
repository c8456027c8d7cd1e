// Library interface for gemini-console-cli so integration tests can reach
// the command parser and the console handlers.

pub mod app;
pub mod commands;

pub use app::{Console, Overrides};
pub use commands::{handle_command, CommandResult};
