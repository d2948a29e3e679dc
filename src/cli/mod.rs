//! CLI output formatting and input parsing
//!
//! Provides the colored terminal display for cycles and the parser for
//! commands typed during an interactive session.

pub mod command;
pub mod display;

pub use command::SessionInput;
pub use display::CycleDisplay;
