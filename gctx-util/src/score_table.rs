use crate::common_io::{open_buf_writer, read_lines};
use crate::errors::{GctxError, Result};
use crate::parquet_io;
use crate::series::LabeledSeries;

use log::info;
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::io::Write;

/// A labelled 2-D score matrix ("gctx" table): pairwise perturbation
/// similarity scores with string identifiers on both axes. Missing
/// values are `NaN`. Symmetric by convention, not enforced.
///
/// Every slicing operation returns a new, independently owned table or
/// series; nothing hands out aliased views.
pub struct ScoreTable {
    mat: DMatrix<f64>,
    rows: Vec<Box<str>>,
    cols: Vec<Box<str>>,
    row_index: HashMap<Box<str>, usize>,
    col_index: HashMap<Box<str>, usize>,
}

/// Column selection, either by zero-based position or by label.
/// Positional selectors resolve against the column-label ordering
/// first, so the two forms agree for every valid position.
pub enum ColumnSelector<'a> {
    Position(usize),
    Label(&'a str),
}

impl From<usize> for ColumnSelector<'_> {
    fn from(index: usize) -> Self {
        ColumnSelector::Position(index)
    }
}

impl<'a> From<&'a str> for ColumnSelector<'a> {
    fn from(label: &'a str) -> Self {
        ColumnSelector::Label(label)
    }
}

impl ScoreTable {
    pub fn new(mat: DMatrix<f64>, rows: Vec<Box<str>>, cols: Vec<Box<str>>) -> Result<Self> {
        if rows.len() != mat.nrows() || cols.len() != mat.ncols() {
            return Err(GctxError::ShapeMismatch {
                nrows: rows.len(),
                ncols: cols.len(),
                mat_rows: mat.nrows(),
                mat_cols: mat.ncols(),
            });
        }

        let row_index = index_labels(&rows)?;
        let col_index = index_labels(&cols)?;

        Ok(Self {
            mat,
            rows,
            cols,
            row_index,
            col_index,
        })
    }

    /// Read a score table from a parquet file; the first column holds
    /// the row names, the remaining numeric columns the scores.
    pub fn from_parquet(file_path: &str) -> Result<Self> {
        let parquet = parquet_io::read_scores(file_path, None)?;

        let nrows = parquet.row_names.len();
        let ncols = parquet.column_names.len();
        let mat = DMatrix::from_row_iterator(nrows, ncols, parquet.row_major_data);

        info!("read {} x {} score table from {}", nrows, ncols, file_path);

        Self::new(mat, parquet.row_names, parquet.column_names)
    }

    /// Read a score table from a delimited text file (plain or `.gz`).
    /// The header line names the columns (its first field labels the
    /// row-name column and is skipped); each data line starts with the
    /// row name. `NA`, `NaN` and empty fields parse as missing. Lines
    /// starting with `#` or `%` are comments and are dropped before
    /// parsing, so row labels cannot begin with either character.
    ///
    /// * `file_path` - input file
    /// * `delim` - field delimiter, e.g. `"\t"`
    ///
    pub fn from_delim(file_path: &str, delim: &str) -> Result<Self> {
        let lines = read_lines(file_path)?;

        let mut line_iter = lines.iter();
        let header = line_iter.next().ok_or_else(|| GctxError::Parse {
            file: file_path.into(),
            line: 1,
            token: "<empty file>".into(),
        })?;

        let cols: Vec<Box<str>> = header
            .split(delim)
            .skip(1)
            .map(|x| x.to_string().into_boxed_str())
            .collect();

        if cols.is_empty() {
            return Err(GctxError::NoNumericColumns(file_path.into()));
        }

        let mut rows: Vec<Box<str>> = Vec::with_capacity(lines.len() - 1);
        let mut data: Vec<f64> = Vec::with_capacity((lines.len() - 1) * cols.len());

        for (i, line) in line_iter.enumerate() {
            let mut fields = line.split(delim);
            let row_name = fields.next().ok_or_else(|| GctxError::Parse {
                file: file_path.into(),
                line: i + 2,
                token: "<empty line>".into(),
            })?;
            rows.push(row_name.to_string().into_boxed_str());

            let mut nvals = 0;
            for field in fields {
                data.push(parse_score(field).ok_or_else(|| GctxError::Parse {
                    file: file_path.into(),
                    line: i + 2,
                    token: field.into(),
                })?);
                nvals += 1;
            }

            if nvals != cols.len() {
                return Err(GctxError::ShapeMismatch {
                    nrows: rows.len(),
                    ncols: nvals,
                    mat_rows: rows.len(),
                    mat_cols: cols.len(),
                });
            }
        }

        let nrows = rows.len();
        let ncols = cols.len();
        let mat = DMatrix::from_row_iterator(nrows, ncols, data);

        info!("read {} x {} score table from {}", nrows, ncols, file_path);

        Self::new(mat, rows, cols)
    }

    pub fn to_parquet(&self, file_path: &str) -> Result<()> {
        parquet_io::write_scores(file_path, &self.mat, &self.rows, &self.cols)
    }

    pub fn to_delim(&self, file_path: &str, delim: &str) -> Result<()> {
        let mut buf = open_buf_writer(file_path)?;

        let header = self
            .cols
            .iter()
            .map(|x| x.as_ref())
            .collect::<Vec<_>>()
            .join(delim);
        writeln!(buf, "row{}{}", delim, header)?;

        for (i, row_name) in self.rows.iter().enumerate() {
            let line = self
                .mat
                .row(i)
                .iter()
                .map(|x| format_score(*x))
                .collect::<Vec<_>>()
                .join(delim);
            writeln!(buf, "{}{}{}", row_name, delim, line)?;
        }
        buf.flush()?;
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.mat.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.mat.ncols()
    }

    pub fn rows(&self) -> &[Box<str>] {
        &self.rows
    }

    pub fn columns(&self) -> &[Box<str>] {
        &self.cols
    }

    /// Score at `(row_label, col_label)`; `None` when either label is
    /// absent or the stored value is missing.
    pub fn get(&self, row_label: &str, col_label: &str) -> Option<f64> {
        let i = *self.row_index.get(row_label)?;
        let j = *self.col_index.get(col_label)?;
        let x = self.mat[(i, j)];
        if x.is_nan() {
            None
        } else {
            Some(x)
        }
    }

    /// Slice one column out as a labelled series, dropping missing
    /// entries. Accepts a zero-based position or a column label.
    pub fn column<'a>(&self, selector: impl Into<ColumnSelector<'a>>) -> Result<LabeledSeries> {
        let label: &str = match selector.into() {
            ColumnSelector::Position(index) => {
                let ncols = self.cols.len();
                self.cols
                    .get(index)
                    .map(|x| x.as_ref())
                    .ok_or(GctxError::ColumnIndex { index, ncols })?
            }
            ColumnSelector::Label(label) => label,
        };

        let j = *self
            .col_index
            .get(label)
            .ok_or_else(|| GctxError::UnknownColumn(label.into()))?;

        let column = self.mat.column(j);
        Ok(LabeledSeries::from_pairs(
            self.rows
                .iter()
                .zip(column.iter())
                .map(|(r, &x)| (r.clone(), x)),
        ))
    }

    /// Extract the square sub-table for the given labels, rows and
    /// columns both reordered to the label order. Fails when any label
    /// is absent from either axis.
    pub fn square_subtable(&self, labels: &[Box<str>]) -> Result<ScoreTable> {
        let row_pos = labels
            .iter()
            .map(|l| {
                self.row_index
                    .get(l)
                    .copied()
                    .ok_or_else(|| GctxError::UnknownLabel(l.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let col_pos = labels
            .iter()
            .map(|l| {
                self.col_index
                    .get(l)
                    .copied()
                    .ok_or_else(|| GctxError::UnknownLabel(l.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let nn = labels.len();
        let mat = DMatrix::from_fn(nn, nn, |i, j| self.mat[(row_pos[i], col_pos[j])]);

        ScoreTable::new(mat, labels.to_vec(), labels.to_vec())
    }
}

fn index_labels(labels: &[Box<str>]) -> Result<HashMap<Box<str>, usize>> {
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), i).is_some() {
            return Err(GctxError::DuplicateLabel(label.clone()));
        }
    }
    Ok(index)
}

fn parse_score(field: &str) -> Option<f64> {
    match field {
        "" | "NA" | "na" | "NaN" | "nan" => Some(f64::NAN),
        _ => field.parse::<f64>().ok(),
    }
}

fn format_score(x: f64) -> String {
    if x.is_nan() {
        "NA".to_string()
    } else {
        format!("{}", x)
    }
}
