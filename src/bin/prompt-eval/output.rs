use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use prompt_eval::EvaluationResult;
use serde::Serialize;

use crate::dataset::Row;

/// One exported line: the evaluated result next to the row it came from.
#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    index: usize,
    text: String,
    status: &'static str,
    succeeded: bool,
    elapsed_seconds: f64,
    prompt: &'a str,
    row: &'a Row,
}

/// A rendered prompt tied to its dataset row.
#[derive(Debug)]
pub struct RenderedRow<'a> {
    pub row_index: usize,
    pub prompt: String,
    pub row: &'a Row,
}

pub fn default_output_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("eval_results_{stamp}.jsonl"))
}

/// Writes one JSON line per result; `rendered` and `results` are both in
/// request order.
pub fn write_results<W: Write>(
    mut writer: W,
    rendered: &[RenderedRow<'_>],
    results: &[EvaluationResult],
) -> anyhow::Result<()> {
    for (source, result) in rendered.iter().zip(results) {
        let record = OutputRecord {
            index: source.row_index,
            text: result.text(),
            status: result.status(),
            succeeded: result.succeeded(),
            elapsed_seconds: result.elapsed_seconds(),
            prompt: &source.prompt,
            row: source.row,
        };
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_results_file(
    path: &Path,
    rendered: &[RenderedRow<'_>],
    results: &[EvaluationResult],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    write_results(BufWriter::new(file), rendered, results)
}
