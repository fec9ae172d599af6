pub mod common_io;
pub mod errors;
pub mod parquet_io;
pub mod score_table;
pub mod series;

pub use errors::{GctxError, Result};
pub use score_table::{ColumnSelector, ScoreTable};
pub use series::{LabeledSeries, DEFAULT_SCORE_CUTOFF};
