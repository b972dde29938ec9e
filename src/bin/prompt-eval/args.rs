use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "prompt-eval",
    about = "Evaluate a prompt template over a dataset against a chat-completions endpoint"
)]
pub struct CliArgs {
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the template for every selected row and evaluate the prompts
    Run(RunArgs),
    /// List configured endpoints
    Providers,
    /// Print the placeholders used by a template
    Placeholders(PlaceholderArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long, short = 't', conflicts_with = "prompt", required_unless_present = "prompt")]
    pub template: Option<PathBuf>,
    #[arg(long)]
    pub prompt: Option<String>,
    #[arg(long, conflicts_with = "system_file")]
    pub system: Option<String>,
    #[arg(long)]
    pub system_file: Option<PathBuf>,
    #[arg(long, short = 'd')]
    pub dataset: PathBuf,
    /// Placeholder to column mapping; placeholders map to the column of the same name when omitted
    #[arg(long = "map", value_name = "PLACEHOLDER=COLUMN", value_parser = parse_mapping)]
    pub mappings: Vec<(String, String)>,
    /// First dataset row to evaluate (0-based, inclusive)
    #[arg(long)]
    pub start: Option<usize>,
    /// Last dataset row to evaluate (0-based, inclusive)
    #[arg(long)]
    pub end: Option<usize>,
    /// Provider name, optionally with a model: `name` or `name:model`
    #[arg(long, short = 'p')]
    pub provider: Option<String>,
    #[arg(long, short = 'm')]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    #[arg(long, short = 'j')]
    pub concurrency: Option<usize>,
    #[arg(long)]
    pub retries: Option<usize>,
    /// Drop in-flight requests on Ctrl-C instead of waiting for them
    #[arg(long)]
    pub abandon_on_cancel: bool,
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PlaceholderArgs {
    #[arg(long, short = 't', conflicts_with = "prompt", required_unless_present = "prompt")]
    pub template: Option<PathBuf>,
    #[arg(long)]
    pub prompt: Option<String>,
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    let (placeholder, column) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PLACEHOLDER=COLUMN, got `{raw}`"))?;
    let placeholder = placeholder.trim();
    let column = column.trim();
    if placeholder.is_empty() || column.is_empty() {
        return Err(format!("expected PLACEHOLDER=COLUMN, got `{raw}`"));
    }
    Ok((placeholder.to_string(), column.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_collects_repeated_mappings() {
        let args = CliArgs::try_parse_from([
            "prompt-eval",
            "run",
            "--prompt",
            "Q: {{question}}",
            "--dataset",
            "rows.jsonl",
            "--map",
            "question=text",
            "--map",
            "topic = subject",
            "-j",
            "8",
        ])
        .unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(
            run.mappings,
            vec![
                ("question".to_string(), "text".to_string()),
                ("topic".to_string(), "subject".to_string()),
            ]
        );
        assert_eq!(run.concurrency, Some(8));
    }

    #[test]
    fn run_requires_a_template_source() {
        assert!(CliArgs::try_parse_from(["prompt-eval", "run", "--dataset", "rows.json"]).is_err());
        assert!(CliArgs::try_parse_from([
            "prompt-eval",
            "run",
            "--dataset",
            "rows.json",
            "--prompt",
            "a",
            "--template",
            "t.txt",
        ])
        .is_err());
    }

    #[test]
    fn mapping_rejects_missing_separator() {
        assert!(parse_mapping("question").is_err());
        assert!(parse_mapping("=column").is_err());
    }
}
