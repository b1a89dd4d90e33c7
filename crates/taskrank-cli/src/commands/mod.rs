//! CLI subcommands and the input handling they share.

pub mod completions;
pub mod config;
pub mod matrix;
pub mod rank;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use taskrank_core::{parse_task_input, Config, OutputFormat, Prioritizer, ScoredTask, ScoringMode};
use tracing::debug;

/// Where tasks come from and how to score them.
#[derive(Args)]
pub struct TaskInput {
    /// Tasks, one per argument. Read from --file or stdin when omitted.
    pub tasks: Vec<String>,
    /// Read tasks from a file (one per line, or a JSON array)
    #[arg(long, short = 'f', conflicts_with = "tasks")]
    pub file: Option<PathBuf>,
    /// Use the offline heuristic only
    #[arg(long)]
    pub offline: bool,
}

impl TaskInput {
    /// Collect the task list from arguments, file or stdin.
    pub fn read(&self) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        if !self.tasks.is_empty() {
            return Ok(self.tasks.clone());
        }

        let text = match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        Ok(parse_task_input(&text)?)
    }
}

/// API key from the environment variable named in config.
fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var(&config.model.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

/// Read and prioritize tasks.
pub fn rank_tasks(
    input: &TaskInput,
    config: &Config,
) -> Result<Vec<ScoredTask>, Box<dyn std::error::Error>> {
    let tasks = input.read()?;
    let mode = ScoringMode::from_use_model(config.model.enabled && !input.offline);
    let api_key = resolve_api_key(config);
    debug!(tasks = tasks.len(), ?mode, credential = api_key.is_some(), "ranking tasks");

    let prioritizer = Prioritizer::from_config(config, api_key);
    Ok(prioritizer.prioritize(&tasks, mode)?)
}

/// clap value parser for `--format`.
pub fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

/// Print to stdout, or write to `output` when given.
pub fn write_output(rendered: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
