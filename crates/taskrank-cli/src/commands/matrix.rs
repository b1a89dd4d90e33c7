//! `taskrank matrix`: Eisenhower quadrants.

use std::path::PathBuf;

use clap::Args;
use taskrank_core::{
    assign_quadrants, build_matrix, to_csv, Config, EisenhowerMatrix, OutputFormat,
};

use super::{parse_format, rank_tasks, write_output, TaskInput};

#[derive(Args)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub input: TaskInput,
    /// Output format: text, json or csv (default from config)
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: MatrixArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut results = rank_tasks(&args.input, &config)?;
    let matrix = build_matrix(&results);

    let rendered = match args.format.unwrap_or(config.output.format) {
        OutputFormat::Text => render_text(&matrix),
        OutputFormat::Json => serde_json::to_string_pretty(&matrix)?,
        OutputFormat::Csv => {
            assign_quadrants(&mut results);
            to_csv(&results)
        }
    };

    write_output(&rendered, args.output.as_deref())
}

fn render_text(matrix: &EisenhowerMatrix) -> String {
    let mut out = String::new();
    for (i, (quadrant, tasks)) in matrix.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("=== {} ===\n", quadrant.title()));
        if tasks.is_empty() {
            out.push_str("  (none)\n");
        }
        for task in tasks {
            out.push_str(&format!("  - {} (Score: {})\n", task.task, task.score));
        }
    }
    out
}
