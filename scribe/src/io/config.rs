//! Configuration for `scribe`, stored as TOML (default `scribe.toml`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::WorkflowSettings;
use crate::error::ConfigError;
use crate::io::atomic::write_atomic;

pub const DEFAULT_CONFIG_PATH: &str = "scribe.toml";

/// Top-level config file.
///
/// Every field has a default, so a missing file or a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ScribeConfig {
    pub workflow: WorkflowSettings,
    pub backend: BackendConfig,
}

/// External command that produces text for the three capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// Program and arguments; the prompt goes to stdin, the reply comes from stdout.
    pub command: Vec<String>,

    /// Environment variables the backend needs (endpoint, credentials).
    pub required_env: Vec<String>,

    /// Wall-clock limit for one capability call.
    pub timeout_secs: u64,

    /// Replies longer than this many bytes are truncated.
    pub output_limit_bytes: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            required_env: vec!["OPENAI_API_BASE".to_string(), "GEMINI_API_KEY".to_string()],
            timeout_secs: 600,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ScribeConfig {
    /// Check values that do not depend on the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workflow.marker.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "workflow.marker must be non-empty".to_string(),
            ));
        }
        if self.workflow.termination_phrase.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "workflow.termination_phrase must be non-empty".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.backend.output_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "backend.output_limit_bytes must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Pre-run check that the backend can be invoked at all.
    ///
    /// `lookup` resolves environment variables; empty values count as missing.
    pub fn check_backend<F>(&self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.validate()?;
        if self.backend.command.is_empty() || self.backend.command[0].trim().is_empty() {
            return Err(ConfigError::MissingCommand);
        }
        let missing: Vec<String> = self
            .backend
            .required_env
            .iter()
            .filter(|name| {
                lookup(name.as_str()).is_none_or(|value| value.trim().is_empty())
            })
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }
        Ok(())
    }

    /// [`Self::check_backend`] against the process environment.
    pub fn check_backend_env(&self) -> Result<(), ConfigError> {
        self.check_backend(|name| std::env::var(name).ok())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ScribeConfig::default()`.
pub fn load_config(path: &Path) -> Result<ScribeConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = ScribeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ScribeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk.
pub fn write_config(path: &Path, cfg: &ScribeConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ScribeConfig {
        ScribeConfig {
            backend: BackendConfig {
                command: vec!["llm".to_string()],
                ..BackendConfig::default()
            },
            ..ScribeConfig::default()
        }
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ScribeConfig::default());
        assert_eq!(cfg.workflow.max_iterations, 2);
        assert_eq!(cfg.workflow.marker, "####");
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scribe.toml");
        let cfg = configured();
        write_config(&path, &cfg).expect("write");
        assert_eq!(load_config(&path).expect("load"), cfg);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scribe.toml");
        fs::write(&path, "[workflow]\nmax_iterations = 5\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.workflow.max_iterations, 5);
        assert_eq!(cfg.workflow.termination_phrase, "无需修改");
        assert_eq!(cfg.backend, BackendConfig::default());
    }

    #[test]
    fn blank_marker_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scribe.toml");
        fs::write(&path, "[workflow]\nmarker = \"  \"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("workflow.marker"));
    }

    #[test]
    fn missing_command_is_a_config_error() {
        let cfg = ScribeConfig::default();
        let err = cfg.check_backend(|_| Some("set".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::MissingCommand);
    }

    #[test]
    fn missing_or_blank_env_is_reported() {
        let cfg = configured();
        let err = cfg
            .check_backend(|name| (name == "OPENAI_API_BASE").then(|| " ".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnv(vec![
                "OPENAI_API_BASE".to_string(),
                "GEMINI_API_KEY".to_string()
            ])
        );
    }

    #[test]
    fn complete_backend_passes_check() {
        let cfg = configured();
        cfg.check_backend(|_| Some("value".to_string()))
            .expect("backend configured");
    }
}
