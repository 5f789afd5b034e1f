//! Reporting utilities: display strings and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - the CLI, the ASCII plot and the TUI show identical labels

pub mod format;

pub use format::*;
