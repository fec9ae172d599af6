pub type Result<T> = std::result::Result<T, GctxError>;

/// Error classes raised by score-table loading and slicing.
#[derive(Debug, thiserror::Error)]
pub enum GctxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("parse error in {file} at line {line}: '{token}'")]
    Parse {
        file: Box<str>,
        line: usize,
        token: Box<str>,
    },

    #[error("column index {index} out of range for {ncols} columns")]
    ColumnIndex { index: usize, ncols: usize },

    #[error("no column named '{0}'")]
    UnknownColumn(Box<str>),

    #[error("no row or column labelled '{0}'")]
    UnknownLabel(Box<str>),

    #[error("duplicate label '{0}'")]
    DuplicateLabel(Box<str>),

    #[error("{nrows} row names and {ncols} column names don't match a {mat_rows} x {mat_cols} matrix")]
    ShapeMismatch {
        nrows: usize,
        ncols: usize,
        mat_rows: usize,
        mat_cols: usize,
    },

    #[error("no numeric columns in {0}")]
    NoNumericColumns(Box<str>),
}
