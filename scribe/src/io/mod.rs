//! I/O helpers for the writing workflows and the `scribe` binary.

pub mod atomic;
pub mod capability;
pub mod config;
pub mod manuscript;
pub mod process;
pub mod prompt;
