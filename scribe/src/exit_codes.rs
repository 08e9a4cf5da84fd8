//! Stable exit codes for the `scribe` binary.

/// Command succeeded.
pub const OK: i32 = 0;
/// The run failed (I/O error, backend failure, invalid input).
pub const FAILED: i32 = 1;
/// The backend is not configured; no workflow was started.
pub const MISCONFIGURED: i32 = 2;
