//! Transition predicates for the book and section state machines.

/// Outcome of evaluating the latest review of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewVerdict {
    /// The review contains the termination phrase.
    Approved,
    /// The refine budget is spent.
    IterationsExhausted,
    /// Another refine pass is required.
    NeedsRevision,
}

impl ReviewVerdict {
    /// True when the section loop must stop.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReviewVerdict::NeedsRevision)
    }
}

/// Decide what follows a review.
///
/// The termination phrase is a plain substring match on free-form review text.
/// An empty phrase never matches.
pub fn review_verdict(
    latest_review: &str,
    termination_phrase: &str,
    iteration_count: u32,
    max_iterations: u32,
) -> ReviewVerdict {
    if !termination_phrase.is_empty() && latest_review.contains(termination_phrase) {
        return ReviewVerdict::Approved;
    }
    if iteration_count >= max_iterations {
        return ReviewVerdict::IterationsExhausted;
    }
    ReviewVerdict::NeedsRevision
}

/// True while sections remain to be dispatched.
pub fn has_next_section(current_index: usize, total_sections: usize) -> bool {
    current_index < total_sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "无需修改";

    #[test]
    fn phrase_approves_even_with_budget_left() {
        assert_eq!(
            review_verdict("整体很好，无需修改。", PHRASE, 0, 2),
            ReviewVerdict::Approved
        );
    }

    #[test]
    fn phrase_wins_over_exhausted_budget() {
        assert_eq!(
            review_verdict(PHRASE, PHRASE, 2, 2),
            ReviewVerdict::Approved
        );
    }

    #[test]
    fn exhausted_budget_ends_loop() {
        let verdict = review_verdict("tighten the ending", PHRASE, 2, 2);
        assert_eq!(verdict, ReviewVerdict::IterationsExhausted);
        assert!(verdict.is_terminal());
    }

    #[test]
    fn zero_budget_ends_after_first_review() {
        assert_eq!(
            review_verdict("rewrite everything", PHRASE, 0, 0),
            ReviewVerdict::IterationsExhausted
        );
    }

    #[test]
    fn remaining_budget_requests_revision() {
        let verdict = review_verdict("tighten the ending", PHRASE, 1, 2);
        assert_eq!(verdict, ReviewVerdict::NeedsRevision);
        assert!(!verdict.is_terminal());
    }

    #[test]
    fn empty_phrase_never_approves() {
        assert_eq!(
            review_verdict("anything", "", 0, 1),
            ReviewVerdict::NeedsRevision
        );
    }

    #[test]
    fn next_section_predicate() {
        assert!(has_next_section(0, 2));
        assert!(has_next_section(1, 2));
        assert!(!has_next_section(2, 2));
        assert!(!has_next_section(0, 0));
    }
}
