use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use prompt_eval::{BatchJob, BatchReport, CancelPolicy, Invoker, RunOptions, SamplingParams};
use tokio_util::sync::CancellationToken;

use crate::args::RunArgs;
use crate::config::{AppConfig, EvaluationConfig};
use crate::dataset::{load_rows, select_rows, PlaceholderMap, Row, Template};
use crate::output::{default_output_path, write_results_file, RenderedRow};
use crate::provider::{build_provider, resolve_endpoint};

/// Evaluation knobs after CLI flags are layered over `[evaluation]`.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    temperature: f32,
    max_tokens: u32,
    concurrency: usize,
    retries: usize,
    policy: CancelPolicy,
}

impl Settings {
    fn merge(args: &RunArgs, config: &EvaluationConfig) -> Self {
        let abandon = args.abandon_on_cancel || config.abandon_on_cancel;
        Self {
            temperature: args.temperature.unwrap_or(config.temperature),
            max_tokens: args.max_tokens.unwrap_or(config.max_tokens),
            concurrency: args.concurrency.unwrap_or(config.concurrency),
            retries: args.retries.unwrap_or(config.retries),
            policy: if abandon {
                CancelPolicy::Abandon
            } else {
                CancelPolicy::FinishInFlight
            },
        }
    }
}

pub async fn run_evaluation(args: &RunArgs, config: &AppConfig) -> anyhow::Result<()> {
    let template = Template::parse(read_template(args.template.as_deref(), args.prompt.as_deref())?)?;
    let system = read_system(args)?;
    let rows = load_rows(&args.dataset)
        .with_context(|| format!("failed to load dataset {}", args.dataset.display()))?;
    let window = select_rows(rows.len(), args.start, args.end)?;
    let mapping = if args.mappings.is_empty() {
        template.identity_mapping()
    } else {
        args.mappings.clone()
    };
    warn_on_mapping(&template, &mapping, rows.get(window.start));
    let rendered = render_rows(&template, &mapping, &rows, window);

    let settings = Settings::merge(args, &config.evaluation);
    let sampling = SamplingParams::new(settings.temperature, settings.max_tokens)?;
    let endpoint = resolve_endpoint(args.provider.as_deref(), args.model.as_deref(), config)?;
    log::info!(
        "evaluating {} rows against {} ({}) at {}",
        rendered.len(),
        endpoint.name,
        endpoint.model,
        endpoint.base_url
    );
    let provider = build_provider(endpoint, settings.retries)?;
    let invoker = Arc::new(Invoker::new(provider));

    let mut job = BatchJob::from_prompts(
        rendered.iter().map(|row| row.prompt.clone()),
        system,
        sampling,
        settings.concurrency,
    )?;
    log::debug!(
        "batch {} built with concurrency {}",
        job.id(),
        job.concurrency()
    );

    let cancel = CancellationToken::new();
    let interrupt = spawn_interrupt_watcher(cancel.clone());
    let options = RunOptions::new()
        .cancellation(cancel)
        .cancel_policy(settings.policy)
        .progress(|fraction| eprint!("\rprogress {:>5.1}%", fraction * 100.0));
    let report = job.run(invoker, options).await;
    interrupt.abort();
    if !rendered.is_empty() {
        eprintln!();
    }
    let report = report?;

    let output = args.output.clone().unwrap_or_else(default_output_path);
    write_results_file(&output, &rendered, &report.results)
        .with_context(|| format!("failed to write results to {}", output.display()))?;
    print_summary(&report, &output);
    Ok(())
}

/// Loads the template from a file or takes it inline.
pub fn read_template(path: Option<&Path>, inline: Option<&str>) -> anyhow::Result<String> {
    match (path, inline) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display())),
        (None, Some(text)) => Ok(text.to_string()),
        (None, None) => bail!("a template is required: pass --template or --prompt"),
    }
}

fn read_system(args: &RunArgs) -> anyhow::Result<Option<String>> {
    if let Some(path) = args.system_file.as_deref() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read system instruction {}", path.display()))?;
        return Ok(Some(text));
    }
    Ok(args.system.clone())
}

fn render_rows<'a>(
    template: &Template,
    mapping: &PlaceholderMap,
    rows: &'a [Row],
    window: std::ops::Range<usize>,
) -> Vec<RenderedRow<'a>> {
    rows[window.clone()]
        .iter()
        .zip(window)
        .map(|(row, row_index)| RenderedRow {
            row_index,
            prompt: template.render(row, mapping),
            row,
        })
        .collect()
}

fn warn_on_mapping(template: &Template, mapping: &PlaceholderMap, sample: Option<&Row>) {
    let placeholders = template.placeholders();
    for (placeholder, column) in mapping {
        if !placeholders.contains(placeholder) {
            log::warn!("mapped placeholder `{placeholder}` does not appear in the template");
        }
        if sample.is_some_and(|row| !row.contains_key(column)) {
            log::warn!("column `{column}` is missing from the first selected row");
        }
    }
}

fn spawn_interrupt_watcher(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupted, cancelling remaining requests");
            log::warn!("interrupt received, cancelling batch");
            cancel.cancel();
        }
    })
}

fn print_summary(report: &BatchReport, output: &Path) {
    let summary = &report.summary;
    eprintln!(
        "{} requests: {} succeeded ({:.1}%), {} failed, {} cancelled",
        summary.total,
        summary.succeeded,
        summary.success_rate() * 100.0,
        summary.failed,
        summary.cancelled,
    );
    eprintln!(
        "{:.2}s wall time, {:.2} req/s, latency mean {:.2}s max {:.2}s",
        summary.wall_time.as_secs_f64(),
        summary.throughput(),
        summary.mean_latency.as_secs_f64(),
        summary.max_latency.as_secs_f64(),
    );
    eprintln!("results written to {}", output.display());
}
