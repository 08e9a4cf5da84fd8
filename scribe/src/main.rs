//! `scribe`: write a long-form text from a sectioned outline.
//!
//! Each `####` section of the outline is drafted, reviewed and refined by an
//! external text backend, then the sections are joined into one manuscript.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use scribe::book::{BookEvent, BookWorkflow};
use scribe::core::splitter::{section_title, split_outline};
use scribe::error::ConfigError;
use scribe::exit_codes;
use scribe::io::capability::CommandCapabilities;
use scribe::io::config::{DEFAULT_CONFIG_PATH, ScribeConfig, load_config, write_config};
use scribe::io::manuscript::{DEFAULT_MANUSCRIPT_PATH, read_outline, write_manuscript};
use scribe::logging;

#[derive(Parser)]
#[command(
    name = "scribe",
    version,
    about = "Write a long-form text from a sectioned outline"
)]
struct Cli {
    /// Log workflow progress to stderr (same as `RUST_LOG=scribe=info`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Draft, review and refine every section, then write the manuscript.
    Write {
        /// Outline document.
        #[arg(long)]
        outline: PathBuf,
        /// Where to write the manuscript.
        #[arg(long, default_value = DEFAULT_MANUSCRIPT_PATH)]
        output: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Override `workflow.max_iterations`.
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// Print the sections the outline splits into.
    Split {
        #[arg(long)]
        outline: PathBuf,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Print the section outlines as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Write a config file with default values.
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "warn,scribe=info" } else { "warn" });

    let code = match run(cli.command) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Write {
            outline,
            output,
            config,
            max_iterations,
        } => cmd_write(&outline, &output, &config, max_iterations),
        Command::Split {
            outline,
            config,
            json,
        } => cmd_split(&outline, &config, json),
        Command::InitConfig { path, force } => cmd_init_config(&path, force),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        exit_codes::MISCONFIGURED
    } else {
        exit_codes::FAILED
    }
}

fn cmd_write(
    outline_path: &Path,
    output: &Path,
    config_path: &Path,
    max_iterations: Option<u32>,
) -> Result<()> {
    load_dotenv(Path::new(DOTENV_PATH));
    let mut cfg = load_config(config_path)?;
    if let Some(max_iterations) = max_iterations {
        cfg.workflow.max_iterations = max_iterations;
    }
    cfg.check_backend_env()?;

    let outline = read_outline(outline_path)?;
    let capabilities = CommandCapabilities::from_config(&cfg)?;
    let outcome = BookWorkflow::new(&capabilities, &cfg.workflow)
        .run(&outline, |event| {
            if let BookEvent::SectionCompleted { report, total } = event {
                eprintln!(
                    "progress: section={}/{} iterations={} reviews={} verdict={:?} title={}",
                    report.index + 1,
                    total,
                    report.iterations,
                    report.reviews,
                    report.verdict,
                    report.title
                );
            }
        })
        .context("write book")?;

    if outcome.sections.is_empty() {
        warn!(outline = %outline_path.display(), "outline has no sections");
        println!("write: sections=0 manuscript not written");
        return Ok(());
    }

    write_manuscript(output, &outcome.manuscript)?;
    println!(
        "write: sections={} path={}",
        outcome.sections.len(),
        output.display()
    );
    Ok(())
}

/// Backend credentials may live in a `.env` file in the working directory.
const DOTENV_PATH: &str = ".env";

/// Load `path` into the process environment. Variables already set win.
fn load_dotenv(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(path = %path.display(), err = %err, "ignoring environment file"),
    }
}

fn cmd_split(outline_path: &Path, config_path: &Path, json: bool) -> Result<()> {
    let cfg = load_config(config_path)?;
    let outline = read_outline(outline_path)?;
    let sections = split_outline(&outline, &cfg.workflow.marker);

    if json {
        let payload = serde_json::to_string_pretty(&sections).context("serialize sections")?;
        println!("{payload}");
        return Ok(());
    }

    println!("sections: {}", sections.len());
    for (i, section) in sections.iter().enumerate() {
        println!("{}: {}", i + 1, section_title(section));
    }
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &ScribeConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("init-config: path={}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_write_with_defaults() {
        let cli = Cli::parse_from(["scribe", "write", "--outline", "book.md"]);
        match cli.command {
            Command::Write {
                outline,
                output,
                config,
                max_iterations,
            } => {
                assert_eq!(outline, PathBuf::from("book.md"));
                assert_eq!(output, PathBuf::from(DEFAULT_MANUSCRIPT_PATH));
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_PATH));
                assert_eq!(max_iterations, None);
            }
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn parse_split_json_verbose() {
        let cli = Cli::parse_from(["scribe", "split", "--outline", "o.md", "--json", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Split { json: true, .. }));
    }

    #[test]
    fn config_errors_map_to_misconfigured() {
        let err = anyhow::Error::new(ConfigError::MissingCommand).context("check backend");
        assert_eq!(exit_code_for(&err), exit_codes::MISCONFIGURED);
        assert_eq!(
            exit_code_for(&anyhow::anyhow!("disk full")),
            exit_codes::FAILED
        );
    }
}
