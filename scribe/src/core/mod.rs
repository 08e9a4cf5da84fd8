//! Deterministic, pure logic shared by the workflows.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! text and return deterministic outputs suitable for tests.

pub mod aggregate;
pub mod decision;
pub mod splitter;
pub mod types;
