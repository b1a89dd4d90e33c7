//! `taskrank rank`: ranked task list.

use std::path::PathBuf;

use clap::Args;
use taskrank_core::{
    assign_quadrants, build_matrix, to_csv, to_json, to_json_report, Config, OutputFormat,
    ScoredTask,
};

use super::{parse_format, rank_tasks, write_output, TaskInput};

#[derive(Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub input: TaskInput,
    /// Output format: text, json or csv (default from config)
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,
    /// Also assign Eisenhower quadrants
    #[arg(long)]
    pub matrix: bool,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: RankArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut results = rank_tasks(&args.input, &config)?;

    let show_matrix = args.matrix || config.output.show_matrix;
    if show_matrix {
        assign_quadrants(&mut results);
    }

    let rendered = match args.format.unwrap_or(config.output.format) {
        OutputFormat::Text => render_text(&results),
        OutputFormat::Json if show_matrix => {
            to_json_report(&results, Some(&build_matrix(&results)))?
        }
        OutputFormat::Json => to_json(&results)?,
        OutputFormat::Csv => to_csv(&results),
    };

    write_output(&rendered, args.output.as_deref())
}

fn render_text(results: &[ScoredTask]) -> String {
    let mut out = String::new();
    if let Some(first) = results.first() {
        out.push_str(&format!("=== Prioritized Tasks (scored by {}) ===\n", first.source));
    }

    for (i, r) in results.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, r.task));
        out.push_str(&format!("   Score: {} ({})\n", r.score, r.priority));
        out.push_str(&format!(
            "   Urgency: {:.2}  Importance: {:.2}\n",
            r.urgency, r.importance
        ));
        if let Some(quadrant) = r.quadrant {
            out.push_str(&format!("   Quadrant: {}\n", quadrant.title()));
        }
        out.push_str(&format!("   Rationale: {}\n", r.reasoning));
    }
    out
}
