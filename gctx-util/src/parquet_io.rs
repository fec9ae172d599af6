use crate::errors::{GctxError, Result};

use nalgebra::DMatrix;
use parquet::basic::Type as ParquetType;
use parquet::basic::{Compression, ConvertedType, Repetition, ZstdLevel};
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RowAccessor;
use parquet::schema::types::Type;
use std::fs::File;
use std::sync::Arc;

pub struct ParquetScores {
    pub row_major_data: Vec<f64>,
    pub row_names: Vec<Box<str>>,
    pub column_names: Vec<Box<str>>,
}

/// Read a labelled score matrix from a parquet file.
///
/// The column at `row_name_index` (default: the first) holds the row
/// names; every FLOAT/DOUBLE/INT32/INT64 column becomes a score column.
///
/// * `file_path`: input parquet file
/// * `row_name_index`: if `None`, the column `0` will be so.
///
pub fn read_scores(file_path: &str, row_name_index: Option<usize>) -> Result<ParquetScores> {
    let row_name_index = row_name_index.unwrap_or(0);

    let file = File::open(file_path)?;
    let reader = SerializedFileReader::new(file)?;
    let metadata = reader.metadata();
    let nrows = metadata.file_metadata().num_rows() as usize;

    let fields = metadata.file_metadata().schema().get_fields();

    let select_indices = fields
        .iter()
        .enumerate()
        .filter_map(|(j, f)| {
            if j == row_name_index {
                return None;
            }
            let tt = f.get_physical_type();
            match tt {
                ParquetType::FLOAT
                | ParquetType::DOUBLE
                | ParquetType::INT32
                | ParquetType::INT64 => Some((tt, j)),
                _ => None,
            }
        })
        .collect::<Vec<_>>();

    if select_indices.is_empty() {
        return Err(GctxError::NoNumericColumns(file_path.into()));
    }

    let ncols = select_indices.len();

    let column_names: Vec<Box<str>> = select_indices
        .iter()
        .map(|&(_, j)| fields[j].name().to_string().into_boxed_str())
        .collect();

    let mut row_names: Vec<Box<str>> = Vec::with_capacity(nrows);
    let mut row_major_data: Vec<f64> = Vec::with_capacity(nrows * ncols);

    for record in reader.get_row_iter(None)? {
        let row = record?;
        row_names.push(row.get_string(row_name_index)?.clone().into_boxed_str());

        for &(tt, j) in select_indices.iter() {
            let x = match tt {
                ParquetType::DOUBLE => row.get_double(j)?,
                ParquetType::FLOAT => row.get_float(j)? as f64,
                ParquetType::INT32 => row.get_int(j)? as f64,
                ParquetType::INT64 => row.get_long(j)? as f64,
                _ => unreachable!("filtered to numeric columns"),
            };
            row_major_data.push(x);
        }
    }

    Ok(ParquetScores {
        row_major_data,
        row_names,
        column_names,
    })
}

/// Write a labelled score matrix to a parquet file: one UTF8 `row`
/// column followed by one DOUBLE column per score column.
pub fn write_scores(
    file_path: &str,
    mat: &DMatrix<f64>,
    row_names: &[Box<str>],
    column_names: &[Box<str>],
) -> Result<()> {
    let schema = build_columns_schema(column_names)?;

    let file = File::create(file_path)?;

    let zstd_level = ZstdLevel::try_new(5)?;
    let writer_properties = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::ZSTD(zstd_level))
            .build(),
    );

    let row_names: Vec<ByteArray> = row_names
        .iter()
        .map(|r| ByteArray::from(r.as_ref()))
        .collect();

    let mut writer = SerializedFileWriter::new(file, schema, writer_properties)?;
    let mut row_group_writer = writer.next_row_group()?;

    if let Some(mut column_writer) = row_group_writer.next_column()? {
        let typed_writer = column_writer.typed::<ByteArrayType>();
        typed_writer.write_batch(&row_names, None, None)?;
        column_writer.close()?;
    }

    for j in 0..mat.ncols() {
        let data_j = mat.column(j).iter().copied().collect::<Vec<_>>();
        if let Some(mut column_writer) = row_group_writer.next_column()? {
            let typed_writer = column_writer.typed::<DoubleType>();
            typed_writer.write_batch(&data_j, None, None)?;
            column_writer.close()?;
        }
    }

    row_group_writer.close()?;
    writer.close()?;
    Ok(())
}

fn build_columns_schema(column_names: &[Box<str>]) -> Result<Arc<Type>> {
    let mut fields = vec![Arc::new(
        Type::primitive_type_builder("row", ParquetType::BYTE_ARRAY)
            .with_repetition(Repetition::REQUIRED)
            .with_converted_type(ConvertedType::UTF8)
            .build()?,
    )];

    for column_name in column_names {
        fields.push(Arc::new(
            Type::primitive_type_builder(column_name, ParquetType::DOUBLE)
                .with_repetition(Repetition::REQUIRED)
                .build()?,
        ));
    }

    let schema = Arc::new(
        Type::group_type_builder("score_table")
            .with_fields(fields)
            .build()?,
    );

    Ok(schema)
}
