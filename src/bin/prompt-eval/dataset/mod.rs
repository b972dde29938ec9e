mod error;
mod rows;
mod template;

pub use rows::{load_rows, select_rows, Row};
pub use template::{PlaceholderMap, Template};
