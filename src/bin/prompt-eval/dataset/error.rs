use std::io;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset IO error: {0}")]
    Io(#[from] io::Error),
    #[error("dataset JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("dataset row {0} is not a JSON object")]
    NotAnObject(usize),
    #[error("row range {start}..={end} is empty for a dataset of {len} rows")]
    EmptyRange { start: usize, end: usize, len: usize },
    #[error("invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}
