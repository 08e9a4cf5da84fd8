//! Per-section state machine: draft, then alternate review and refine.
//!
//! ```text
//! Draft -> Review -> (Refine -> Review)* -> End
//! ```
//!
//! Each phase has one transition function that performs at most one
//! capability call and returns the next phase. The loop is bounded: at most
//! `max_iterations` refine passes and `max_iterations + 1` reviews.

use tracing::{debug, instrument};

use crate::core::decision::{ReviewVerdict, review_verdict};
use crate::core::types::Stage;
use crate::error::CapabilityError;
use crate::io::capability::Capabilities;

/// Phase of a section workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionPhase {
    Draft,
    Review,
    Refine,
    End,
}

/// Working state of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionState {
    pub outline: String,
    /// Output of the single generate call; empty until `Draft` has run.
    pub draft: String,
    /// Every review so far, oldest first.
    pub reviews: Vec<String>,
    /// Latest revision, if any refine pass has run.
    pub refined_draft: Option<String>,
    pub iteration_count: u32,
    pub max_iterations: u32,
}

impl SectionState {
    pub fn new(outline: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            outline: outline.into(),
            draft: String::new(),
            reviews: Vec::new(),
            refined_draft: None,
            iteration_count: 0,
            max_iterations,
        }
    }

    /// The most recent text: the refined draft if present, else the draft.
    pub fn current_text(&self) -> &str {
        self.refined_draft.as_deref().unwrap_or(&self.draft)
    }

    pub fn latest_review(&self) -> Option<&str> {
        self.reviews.last().map(String::as_str)
    }

    /// Text the section contributes to the manuscript.
    pub fn into_final_text(self) -> String {
        self.refined_draft.unwrap_or(self.draft)
    }
}

/// Result of running a section to `End`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutcome {
    pub text: String,
    /// Refine passes performed.
    pub iterations: u32,
    /// Reviews requested.
    pub reviews: usize,
    /// Why the loop stopped.
    pub verdict: ReviewVerdict,
}

/// Drives one section through its phases against a capability backend.
pub struct SectionWorkflow<'a, C: Capabilities> {
    capabilities: &'a C,
    section: usize,
    termination_phrase: &'a str,
}

impl<'a, C: Capabilities> SectionWorkflow<'a, C> {
    /// `section` is the 0-based position in the book, used for error context.
    pub fn new(capabilities: &'a C, section: usize, termination_phrase: &'a str) -> Self {
        Self {
            capabilities,
            section,
            termination_phrase,
        }
    }

    /// Run from `Draft` to `End`, reporting every phase entered to `on_phase`.
    #[instrument(skip_all, fields(section = self.section + 1, max_iterations = state.max_iterations))]
    pub fn run<F: FnMut(SectionPhase, &SectionState)>(
        &self,
        mut state: SectionState,
        mut on_phase: F,
    ) -> Result<SectionOutcome, CapabilityError> {
        let mut phase = SectionPhase::Draft;
        let mut verdict = ReviewVerdict::NeedsRevision;
        on_phase(phase, &state);

        while phase != SectionPhase::End {
            let next = self.step(phase, &mut state)?;
            if phase == SectionPhase::Review {
                verdict = self.verdict(&state);
            }
            debug!(from = ?phase, to = ?next, iteration = state.iteration_count, "section transition");
            phase = next;
            on_phase(phase, &state);
        }

        Ok(SectionOutcome {
            iterations: state.iteration_count,
            reviews: state.reviews.len(),
            verdict,
            text: state.into_final_text(),
        })
    }

    /// Apply the transition for `phase` and return the next phase.
    pub fn step(
        &self,
        phase: SectionPhase,
        state: &mut SectionState,
    ) -> Result<SectionPhase, CapabilityError> {
        match phase {
            SectionPhase::Draft => self.draft(state),
            SectionPhase::Review => self.review(state),
            SectionPhase::Refine => self.refine(state),
            SectionPhase::End => Ok(SectionPhase::End),
        }
    }

    fn draft(&self, state: &mut SectionState) -> Result<SectionPhase, CapabilityError> {
        state.draft = self
            .capabilities
            .generate(&state.outline)
            .map_err(|err| self.failed(Stage::Generate, err))?;
        state.reviews.clear();
        state.refined_draft = None;
        state.iteration_count = 0;
        Ok(SectionPhase::Review)
    }

    fn review(&self, state: &mut SectionState) -> Result<SectionPhase, CapabilityError> {
        let review = self
            .capabilities
            .critique(state.current_text())
            .map_err(|err| self.failed(Stage::Critique, err))?;
        state.reviews.push(review);

        if self.verdict(state).is_terminal() {
            return Ok(SectionPhase::End);
        }
        Ok(SectionPhase::Refine)
    }

    fn refine(&self, state: &mut SectionState) -> Result<SectionPhase, CapabilityError> {
        let review = state.latest_review().unwrap_or_default();
        let refined = self
            .capabilities
            .revise(state.current_text(), review)
            .map_err(|err| self.failed(Stage::Revise, err))?;
        state.refined_draft = Some(refined);
        state.iteration_count += 1;
        debug_assert!(state.iteration_count <= state.max_iterations);
        Ok(SectionPhase::Review)
    }

    fn verdict(&self, state: &SectionState) -> ReviewVerdict {
        review_verdict(
            state.latest_review().unwrap_or_default(),
            self.termination_phrase,
            state.iteration_count,
            state.max_iterations,
        )
    }

    fn failed(&self, stage: Stage, err: anyhow::Error) -> CapabilityError {
        CapabilityError::new(self.section, stage, err)
    }
}
