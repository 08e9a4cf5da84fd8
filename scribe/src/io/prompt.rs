//! Prompt rendering for the three capability operations.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const WRITER_TEMPLATE: &str = include_str!("prompts/writer.md");
const REVIEWER_TEMPLATE: &str = include_str!("prompts/reviewer.md");
const REFINER_TEMPLATE: &str = include_str!("prompts/refiner.md");

/// Renders writer, reviewer and refiner prompts from embedded templates.
pub struct PromptBuilder {
    env: Environment<'static>,
    termination_phrase: String,
}

impl PromptBuilder {
    /// `termination_phrase` is what the reviewer is told to answer with when
    /// a draft needs no changes.
    pub fn new(termination_phrase: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("writer", WRITER_TEMPLATE)
            .context("load writer template")?;
        env.add_template("reviewer", REVIEWER_TEMPLATE)
            .context("load reviewer template")?;
        env.add_template("refiner", REFINER_TEMPLATE)
            .context("load refiner template")?;
        Ok(Self {
            env,
            termination_phrase: termination_phrase.into(),
        })
    }

    pub fn writer(&self, outline: &str) -> Result<String> {
        self.env
            .get_template("writer")?
            .render(context! { outline => outline.trim() })
            .context("render writer prompt")
    }

    pub fn reviewer(&self, draft: &str) -> Result<String> {
        self.env
            .get_template("reviewer")?
            .render(context! {
                draft => draft.trim(),
                termination_phrase => self.termination_phrase.as_str(),
            })
            .context("render reviewer prompt")
    }

    pub fn refiner(&self, draft: &str, review: &str) -> Result<String> {
        self.env
            .get_template("refiner")?
            .render(context! {
                draft => draft.trim(),
                review => review.trim(),
            })
            .context("render refiner prompt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::new("无需修改").expect("templates")
    }

    #[test]
    fn writer_embeds_trimmed_outline() {
        let prompt = builder().writer("\n#### Chapter 1\n- intro\n\n").expect("render");
        assert!(prompt.contains("<outline>\n#### Chapter 1\n- intro\n</outline>"));
    }

    #[test]
    fn reviewer_names_termination_phrase() {
        let prompt = builder().reviewer("the draft").expect("render");
        assert!(prompt.contains("\"无需修改\""));
        assert!(prompt.contains("<draft>\nthe draft\n</draft>"));
    }

    /// Draft must precede review so the refiner reads the text before the critique.
    #[test]
    fn refiner_places_draft_before_review() {
        let prompt = builder().refiner("old text", "fix the ending").expect("render");
        let draft_pos = prompt.find("old text").expect("draft");
        let review_pos = prompt.find("fix the ending").expect("review");
        assert!(draft_pos < review_pos);
    }

    #[test]
    fn outline_is_not_html_escaped() {
        let prompt = builder().writer("#### A & B <intro>").expect("render");
        assert!(prompt.contains("#### A & B <intro>"));
    }
}
