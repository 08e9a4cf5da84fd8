//! Test-only helpers: scripted capabilities and outline fixtures.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::splitter::DEFAULT_MARKER;
use crate::core::types::{DEFAULT_TERMINATION_PHRASE, Stage};
use crate::io::capability::Capabilities;

/// One recorded capability invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCall {
    Generate { outline: String },
    Critique { text: String },
    Revise { text: String, review: String },
}

impl CapabilityCall {
    pub fn stage(&self) -> Stage {
        match self {
            CapabilityCall::Generate { .. } => Stage::Generate,
            CapabilityCall::Critique { .. } => Stage::Critique,
            CapabilityCall::Revise { .. } => Stage::Revise,
        }
    }
}

/// Deterministic draft produced by [`ScriptedCapabilities::generate`].
pub fn draft_of(outline: &str) -> String {
    format!("draft<{outline}>")
}

/// Deterministic revision produced by [`ScriptedCapabilities::revise`].
pub fn revised(text: &str, review: &str) -> String {
    format!("revised<{text} | {review}>")
}

/// Non-approving review returned for the `n`th critique call (1-indexed, run-wide).
pub fn numbered_review(n: usize) -> String {
    format!("review {n}: tighten the prose")
}

/// Review text that contains the default termination phrase.
pub fn approving_review() -> String {
    format!("Reads well. {DEFAULT_TERMINATION_PHRASE}")
}

/// Outline with one `####` section per title.
pub fn outline_of(titles: &[&str]) -> String {
    titles
        .iter()
        .map(|title| format!("{DEFAULT_MARKER} {title}\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Capabilities with scripted reviews, recorded calls and optional injected failure.
///
/// Queued reviews are consumed first; afterwards every review either approves
/// or is a [`numbered_review`], depending on the constructor.
pub struct ScriptedCapabilities {
    reviews: RefCell<VecDeque<String>>,
    approve_by_default: bool,
    fail_on: Option<(Stage, usize)>,
    calls: RefCell<Vec<CapabilityCall>>,
}

impl ScriptedCapabilities {
    /// Every critique contains the termination phrase.
    pub fn approving() -> Self {
        Self::build(Vec::new(), true)
    }

    /// No critique ever contains the termination phrase.
    pub fn never_approving() -> Self {
        Self::build(Vec::new(), false)
    }

    /// Return `reviews` in order, then fall back to non-approving reviews.
    pub fn with_reviews(reviews: Vec<String>) -> Self {
        Self::build(reviews, false)
    }

    /// Fail the `nth` (1-indexed, run-wide) call of `stage`.
    pub fn failing_on(mut self, stage: Stage, nth: usize) -> Self {
        self.fail_on = Some((stage, nth));
        self
    }

    pub fn calls(&self) -> Vec<CapabilityCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.stage() == stage)
            .count()
    }

    fn build(reviews: Vec<String>, approve_by_default: bool) -> Self {
        Self {
            reviews: RefCell::new(reviews.into()),
            approve_by_default,
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Record `call` and return its run-wide ordinal for that stage.
    fn record(&self, call: CapabilityCall) -> Result<usize> {
        let stage = call.stage();
        self.calls.borrow_mut().push(call);
        let nth = self.count(stage);
        if self.fail_on == Some((stage, nth)) {
            return Err(anyhow!("scripted {stage} failure on call {nth}"));
        }
        Ok(nth)
    }
}

impl Capabilities for ScriptedCapabilities {
    fn generate(&self, section_outline: &str) -> Result<String> {
        self.record(CapabilityCall::Generate {
            outline: section_outline.to_string(),
        })?;
        Ok(draft_of(section_outline))
    }

    fn critique(&self, current_text: &str) -> Result<String> {
        let nth = self.record(CapabilityCall::Critique {
            text: current_text.to_string(),
        })?;
        if let Some(review) = self.reviews.borrow_mut().pop_front() {
            return Ok(review);
        }
        if self.approve_by_default {
            return Ok(approving_review());
        }
        Ok(numbered_review(nth))
    }

    fn revise(&self, current_text: &str, review: &str) -> Result<String> {
        self.record(CapabilityCall::Revise {
            text: current_text.to_string(),
            review: review.to_string(),
        })?;
        Ok(revised(current_text, review))
    }
}
