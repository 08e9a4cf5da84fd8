//! Shared deterministic types for the writing workflows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::splitter::DEFAULT_MARKER;

/// Review text that signals a section needs no further revision.
pub const DEFAULT_TERMINATION_PHRASE: &str = "无需修改";

/// Refine passes allowed per section unless configured otherwise.
pub const DEFAULT_MAX_ITERATIONS: u32 = 2;

/// The capability operation a workflow was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generate,
    Critique,
    Revise,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Generate => "generate",
            Stage::Critique => "critique",
            Stage::Revise => "revise",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs applied uniformly to every section of a book.
///
/// Stored under `[workflow]` in the config file; missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Maximum refine passes per section.
    pub max_iterations: u32,
    /// Token that opens every section in the outline.
    pub marker: String,
    /// Substring of a review that ends the refine loop early.
    pub termination_phrase: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            marker: DEFAULT_MARKER.to_string(),
            termination_phrase: DEFAULT_TERMINATION_PHRASE.to_string(),
        }
    }
}
