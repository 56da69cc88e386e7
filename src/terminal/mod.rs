//! Terminal easter egg
//!
//! A line-based command interpreter. Every command is a synchronous local
//! state change or an output line; window-level effects are handed back to
//! the caller.

pub mod command;
pub mod session;
pub mod theme;

pub use command::{Command, CommandError, parse_command};
pub use session::{Line, LineKind, Terminal, TerminalEffect};
pub use theme::{Theme, ThemePalette};
