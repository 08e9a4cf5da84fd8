//! Book-level state machine: split the outline, write every section in order,
//! compile the manuscript.
//!
//! ```text
//! Split -> Dispatch (once per section) -> Compile -> Done
//! ```
//!
//! Transitions take the [`BookState`] by value and return the next one, so a
//! failed transition leaves nothing half-updated behind: the error is returned
//! and the state is dropped.

use tracing::{debug, info, instrument};

use crate::core::aggregate::compile_manuscript;
use crate::core::decision::{ReviewVerdict, has_next_section};
use crate::core::splitter::{section_title, split_outline};
use crate::core::types::WorkflowSettings;
use crate::error::CapabilityError;
use crate::io::capability::Capabilities;
use crate::section::{SectionPhase, SectionState, SectionWorkflow};

/// Phase of the book workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookPhase {
    Split,
    Dispatch,
    Compile,
    Done,
}

/// Working state of a book run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookState {
    pub outline: String,
    pub section_outlines: Vec<String>,
    /// Final texts of finished sections, in outline order.
    pub completed_sections: Vec<String>,
    /// Next section to dispatch; never exceeds `section_outlines.len()`.
    pub current_index: usize,
    /// Set by `Compile`.
    pub final_manuscript: Option<String>,
}

impl BookState {
    pub fn new(outline: impl Into<String>) -> Self {
        Self {
            outline: outline.into(),
            ..Self::default()
        }
    }
}

/// Summary of one finished section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    /// 0-based position in the outline.
    pub index: usize,
    pub title: String,
    pub iterations: u32,
    pub reviews: usize,
    pub verdict: ReviewVerdict,
}

/// Progress notifications emitted while a book is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    /// The book workflow entered `phase`.
    Phase(BookPhase),
    /// The section at `index` entered `phase`.
    Section { index: usize, phase: SectionPhase },
    /// A section reached `End`; `total` is the number of sections in the book.
    SectionCompleted { report: SectionReport, total: usize },
}

/// Result of a successful book run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookOutcome {
    pub manuscript: String,
    pub sections: Vec<SectionReport>,
}

/// Drives a whole book through its phases.
pub struct BookWorkflow<'a, C: Capabilities> {
    capabilities: &'a C,
    settings: &'a WorkflowSettings,
}

impl<'a, C: Capabilities> BookWorkflow<'a, C> {
    pub fn new(capabilities: &'a C, settings: &'a WorkflowSettings) -> Self {
        Self {
            capabilities,
            settings,
        }
    }

    /// Run from `Split` to `Done`.
    ///
    /// Any capability failure aborts the run; sections finished before the
    /// failure are discarded and no manuscript is returned.
    #[instrument(skip_all, fields(max_iterations = self.settings.max_iterations))]
    pub fn run<F: FnMut(&BookEvent)>(
        &self,
        outline: &str,
        mut on_event: F,
    ) -> Result<BookOutcome, CapabilityError> {
        let mut state = BookState::new(outline);
        let mut reports = Vec::new();
        let mut phase = BookPhase::Split;
        on_event(&BookEvent::Phase(phase));

        while phase != BookPhase::Done {
            let (next, next_state) = self.step(phase, state, &mut reports, &mut on_event)?;
            if next != phase {
                debug!(from = ?phase, to = ?next, "book transition");
                on_event(&BookEvent::Phase(next));
            }
            phase = next;
            state = next_state;
        }

        Ok(BookOutcome {
            manuscript: state.final_manuscript.unwrap_or_default(),
            sections: reports,
        })
    }

    fn step<F: FnMut(&BookEvent)>(
        &self,
        phase: BookPhase,
        state: BookState,
        reports: &mut Vec<SectionReport>,
        on_event: &mut F,
    ) -> Result<(BookPhase, BookState), CapabilityError> {
        match phase {
            BookPhase::Split => Ok(self.split(state)),
            BookPhase::Dispatch => self.dispatch(state, reports, on_event),
            BookPhase::Compile => Ok(self.compile(state)),
            BookPhase::Done => Ok((BookPhase::Done, state)),
        }
    }

    fn split(&self, state: BookState) -> (BookPhase, BookState) {
        let section_outlines = split_outline(&state.outline, &self.settings.marker);
        info!(sections = section_outlines.len(), "outline split");
        (
            BookPhase::Dispatch,
            BookState {
                section_outlines,
                completed_sections: Vec::new(),
                current_index: 0,
                final_manuscript: None,
                ..state
            },
        )
    }

    /// Write the section at `current_index`, or move on to `Compile` when none remain.
    fn dispatch<F: FnMut(&BookEvent)>(
        &self,
        state: BookState,
        reports: &mut Vec<SectionReport>,
        on_event: &mut F,
    ) -> Result<(BookPhase, BookState), CapabilityError> {
        let total = state.section_outlines.len();
        let index = state.current_index;
        if !has_next_section(index, total) {
            return Ok((BookPhase::Compile, state));
        }

        let section_outline = &state.section_outlines[index];
        info!(
            section = index + 1,
            total,
            title = section_title(section_outline),
            "writing section"
        );
        let workflow =
            SectionWorkflow::new(self.capabilities, index, &self.settings.termination_phrase);
        let outcome = workflow.run(
            SectionState::new(section_outline.as_str(), self.settings.max_iterations),
            |phase, _| on_event(&BookEvent::Section { index, phase }),
        )?;

        let report = SectionReport {
            index,
            title: section_title(section_outline).to_string(),
            iterations: outcome.iterations,
            reviews: outcome.reviews,
            verdict: outcome.verdict,
        };
        info!(
            section = index + 1,
            total,
            iterations = report.iterations,
            verdict = ?report.verdict,
            "section complete"
        );
        on_event(&BookEvent::SectionCompleted {
            report: report.clone(),
            total,
        });
        reports.push(report);

        let mut completed_sections = state.completed_sections;
        completed_sections.push(outcome.text);
        Ok((
            BookPhase::Dispatch,
            BookState {
                completed_sections,
                current_index: index + 1,
                ..state
            },
        ))
    }

    fn compile(&self, state: BookState) -> (BookPhase, BookState) {
        let manuscript = compile_manuscript(&state.completed_sections);
        info!(
            sections = state.completed_sections.len(),
            bytes = manuscript.len(),
            "manuscript compiled"
        );
        (
            BookPhase::Done,
            BookState {
                final_manuscript: Some(manuscript),
                ..state
            },
        )
    }
}

/// Write a book from `outline` with `settings`, discarding progress events.
pub fn write_book<C: Capabilities>(
    capabilities: &C,
    settings: &WorkflowSettings,
    outline: &str,
) -> Result<BookOutcome, CapabilityError> {
    BookWorkflow::new(capabilities, settings).run(outline, |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Stage;
    use crate::test_support::{ScriptedCapabilities, draft_of, outline_of};

    fn settings(max_iterations: u32) -> WorkflowSettings {
        WorkflowSettings {
            max_iterations,
            ..WorkflowSettings::default()
        }
    }

    #[test]
    fn outline_without_sections_compiles_empty_manuscript() {
        let caps = ScriptedCapabilities::never_approving();
        let mut phases = Vec::new();
        let outcome = BookWorkflow::new(&caps, &settings(2))
            .run("just a title, no sections", |event| {
                if let BookEvent::Phase(phase) = event {
                    phases.push(*phase);
                }
            })
            .expect("book");

        assert_eq!(outcome.manuscript, "");
        assert!(outcome.sections.is_empty());
        assert!(caps.calls().is_empty());
        assert_eq!(
            phases,
            vec![
                BookPhase::Split,
                BookPhase::Dispatch,
                BookPhase::Compile,
                BookPhase::Done
            ]
        );
    }

    #[test]
    fn sections_are_dispatched_in_order() {
        let caps = ScriptedCapabilities::approving();
        let mut started = Vec::new();
        let mut completed = Vec::new();
        BookWorkflow::new(&caps, &settings(2))
            .run(&outline_of(&["A", "B", "C"]), |event| match event {
                BookEvent::Section {
                    index,
                    phase: SectionPhase::Draft,
                } => started.push(*index),
                BookEvent::SectionCompleted { report, total } => {
                    completed.push((report.index, *total));
                }
                _ => {}
            })
            .expect("book");

        assert_eq!(started, vec![0, 1, 2]);
        assert_eq!(completed, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn split_resets_progress() {
        let caps = ScriptedCapabilities::approving();
        let settings = settings(2);
        let workflow = BookWorkflow::new(&caps, &settings);
        let stale = BookState {
            outline: outline_of(&["A"]),
            completed_sections: vec!["stale".to_string()],
            current_index: 7,
            ..BookState::default()
        };

        let (next, state) = workflow.split(stale);
        assert_eq!(next, BookPhase::Dispatch);
        assert_eq!(state.section_outlines, vec!["#### A"]);
        assert!(state.completed_sections.is_empty());
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn dispatch_advances_one_section_per_step() {
        let caps = ScriptedCapabilities::approving();
        let settings = settings(2);
        let workflow = BookWorkflow::new(&caps, &settings);
        let (_, state) = workflow.split(BookState::new(outline_of(&["A", "B"])));
        let mut reports = Vec::new();
        let mut sink = |_: &BookEvent| {};

        let (next, state) = workflow
            .dispatch(state, &mut reports, &mut sink)
            .expect("first");
        assert_eq!(next, BookPhase::Dispatch);
        assert_eq!(state.current_index, 1);
        assert_eq!(state.completed_sections, vec![draft_of("#### A")]);

        let (next, state) = workflow
            .dispatch(state, &mut reports, &mut sink)
            .expect("second");
        assert_eq!(next, BookPhase::Dispatch);
        assert_eq!(state.current_index, 2);

        let (next, state) = workflow
            .dispatch(state, &mut reports, &mut sink)
            .expect("third");
        assert_eq!(next, BookPhase::Compile);
        assert_eq!(state.current_index, state.section_outlines.len());
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn failure_in_later_section_aborts_run() {
        // Section A uses revise calls 1 and 2; section B fails on its first.
        let caps = ScriptedCapabilities::never_approving().failing_on(Stage::Revise, 3);
        let err = write_book(&caps, &settings(2), &outline_of(&["A", "B", "C"])).unwrap_err();

        assert_eq!(err.section, 1);
        assert_eq!(err.stage, Stage::Revise);
        assert_eq!(caps.count(Stage::Generate), 2);
    }
}
