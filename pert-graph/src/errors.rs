pub type Result<T> = std::result::Result<T, GraphError>;

/// Error classes raised by graph construction and analysis.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("adjacency table is not square: {nrows} rows x {ncols} columns")]
    NotSquare { nrows: usize, ncols: usize },

    #[error("row and column labels disagree at position {0}")]
    AxisMismatch(usize),

    #[error("no metadata record for perturbation '{0}'")]
    MetadataMissing(Box<str>),

    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error("no node labelled '{0}'")]
    UnknownNode(Box<str>),

    #[error("empty mean: {0}")]
    EmptyMean(&'static str),
}
