//! Capability abstraction for text generation.
//!
//! The [`Capabilities`] trait decouples the writing workflows from the text
//! backend. [`CommandCapabilities`] pipes rendered prompts through an external
//! command; tests use scripted capabilities that return predetermined text
//! without spawning processes.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument, warn};

use crate::core::types::Stage;
use crate::error::ConfigError;
use crate::io::config::ScribeConfig;
use crate::io::process::run_command_with_timeout;
use crate::io::prompt::PromptBuilder;

/// Environment variable telling the backend command which operation it serves.
pub const STAGE_ENV: &str = "SCRIBE_STAGE";

/// The three text operations the workflows depend on.
///
/// Each call either returns text or fails; a failure aborts the run.
pub trait Capabilities {
    /// Draft a section from its outline.
    fn generate(&self, section_outline: &str) -> Result<String>;
    /// Review the current text of a section.
    fn critique(&self, current_text: &str) -> Result<String>;
    /// Apply a review to the current text.
    fn revise(&self, current_text: &str, review: &str) -> Result<String>;
}

/// Capabilities backed by an external command.
///
/// The rendered prompt is written to the command's stdin and its stdout is the
/// reply. [`STAGE_ENV`] is set to `generate`, `critique` or `revise`.
pub struct CommandCapabilities {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
    prompts: PromptBuilder,
}

impl CommandCapabilities {
    /// Build from config after the backend pre-run check.
    pub fn from_config(cfg: &ScribeConfig) -> Result<Self> {
        if cfg.backend.command.is_empty() {
            return Err(ConfigError::MissingCommand.into());
        }
        Ok(Self {
            command: cfg.backend.command.clone(),
            timeout: cfg.backend.timeout(),
            output_limit_bytes: cfg.backend.output_limit_bytes,
            prompts: PromptBuilder::new(cfg.workflow.termination_phrase.clone())?,
        })
    }

    #[instrument(skip_all, fields(stage = %stage, prompt_bytes = prompt.len()))]
    fn invoke(&self, stage: Stage, prompt: &str) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("backend command is empty"))?;
        info!(program = %program, "invoking backend");

        let mut cmd = Command::new(program);
        cmd.args(args).env(STAGE_ENV, stage.as_str());

        let output = run_command_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run backend {program}"))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "backend timed out");
            bail!("backend timed out after {:?}", self.timeout);
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "backend failed");
            bail!(
                "backend exited with status {:?}: {}",
                output.status.code(),
                output.stderr_text()
            );
        }
        if output.stdout_truncated > 0 {
            warn!(
                truncated = output.stdout_truncated,
                "backend reply truncated"
            );
            bail!(
                "backend reply exceeds output_limit_bytes ({} bytes, {} more discarded)",
                self.output_limit_bytes,
                output.stdout_truncated
            );
        }

        let reply = String::from_utf8(output.stdout)
            .context("backend reply is not valid UTF-8")?
            .trim_end()
            .to_string();
        if reply.trim().is_empty() {
            bail!("backend returned an empty reply");
        }
        debug!(reply_bytes = reply.len(), "backend replied");
        Ok(reply)
    }
}

impl Capabilities for CommandCapabilities {
    fn generate(&self, section_outline: &str) -> Result<String> {
        let prompt = self.prompts.writer(section_outline)?;
        self.invoke(Stage::Generate, &prompt)
    }

    fn critique(&self, current_text: &str) -> Result<String> {
        let prompt = self.prompts.reviewer(current_text)?;
        self.invoke(Stage::Critique, &prompt)
    }

    fn revise(&self, current_text: &str, review: &str) -> Result<String> {
        let prompt = self.prompts.refiner(current_text, review)?;
        self.invoke(Stage::Revise, &prompt)
    }
}
