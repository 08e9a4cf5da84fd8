//! Outline-driven long-form writer.
//!
//! An outline is split into sections; each section is drafted, reviewed and
//! refined until a reviewer approves it or the refine budget runs out; the
//! finished sections are joined into one manuscript. The architecture keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (splitting, transition
//!   predicates, aggregation). No I/O.
//! - **[`io`]**: The capability boundary and everything that touches the
//!   outside world (backend process, prompts, config, files).
//!
//! The state machines ([`section`], [`book`]) combine the two and only talk to
//! the text backend through [`io::capability::Capabilities`].

pub mod book;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod section;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
