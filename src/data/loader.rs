use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{IndexRecord, IndexTable};

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Header spelling accepted for each required column. The dataset ships with
/// Chinese headers; exports and hand-made fixtures use the English ones.
const YEAR_ALIASES: &[&str] = &["year", "年份"];
const CODE_ALIASES: &[&str] = &["stock_code", "code", "股票代码"];
const NAME_ALIASES: &[&str] = &["company_name", "company", "企业名称"];
const INDEX_ALIASES: &[&str] = &["index_value", "dt_index", "数字化转型指数"];

/// Canonical names used in error messages.
const COL_YEAR: &str = "year";
const COL_CODE: &str = "stock_code";
const COL_NAME: &str = "company_name";
const COL_INDEX: &str = "index_value";

fn find_header(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim() == *a))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an index dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – records-oriented array: `[{ "year": 2020, ... }, ...]`
/// * `.parquet` – flat columns, as written by Pandas/Polars or
///   `generate_sample`
pub fn load_file(path: &Path) -> Result<IndexTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<IndexTable, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let year_idx =
        find_header(&headers, YEAR_ALIASES).ok_or(LoadError::MissingColumn(COL_YEAR))?;
    let code_idx =
        find_header(&headers, CODE_ALIASES).ok_or(LoadError::MissingColumn(COL_CODE))?;
    let name_idx =
        find_header(&headers, NAME_ALIASES).ok_or(LoadError::MissingColumn(COL_NAME))?;
    let index_idx =
        find_header(&headers, INDEX_ALIASES).ok_or(LoadError::MissingColumn(COL_INDEX))?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let field = |idx: usize| row.get(idx).unwrap_or("").trim();

        records.push(IndexRecord {
            year: parse_year(field(year_idx), row_no)?,
            stock_code: field(code_idx).to_string(),
            company_name: field(name_idx).to_string(),
            index_value: field(index_idx).parse::<f64>().map_err(|_| {
                LoadError::malformed(row_no, format!("'{}' is not a number", field(index_idx)))
            })?,
        });
    }

    Ok(IndexTable::from_records(records))
}

/// Years may arrive as `2020` or as a float-formatted `2020.0`.
fn parse_year(s: &str, row: usize) -> Result<i32, LoadError> {
    if let Ok(y) = s.parse::<i32>() {
        return Ok(y);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 => Ok(f as i32),
        _ => Err(LoadError::malformed(row, format!("'{s}' is not a year"))),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "year": 2020, "stock_code": "600000", "company_name": "A Bank",
///     "index_value": 1.23 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<IndexTable, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::malformed(0, "expected top-level JSON array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::malformed(row_no, "row is not a JSON object"))?;

        let get = |aliases: &[&str], canonical: &'static str| {
            aliases
                .iter()
                .find_map(|a| obj.get(*a))
                .ok_or(LoadError::MissingColumn(canonical))
        };

        let year = match get(YEAR_ALIASES, COL_YEAR)? {
            JsonValue::Number(n) => parse_year(&n.to_string(), row_no)?,
            JsonValue::String(s) => parse_year(s, row_no)?,
            other => {
                return Err(LoadError::malformed(row_no, format!("bad year: {other}")));
            }
        };

        // Stock codes written by pandas often come out numeric.
        let stock_code = match get(CODE_ALIASES, COL_CODE)? {
            JsonValue::String(s) => s.trim().to_string(),
            JsonValue::Number(n) => n.to_string(),
            other => {
                return Err(LoadError::malformed(row_no, format!("bad code: {other}")));
            }
        };

        let company_name = get(NAME_ALIASES, COL_NAME)?
            .as_str()
            .ok_or_else(|| LoadError::malformed(row_no, "company name is not a string"))?
            .trim()
            .to_string();

        let index_value = get(INDEX_ALIASES, COL_INDEX)?
            .as_f64()
            .ok_or_else(|| LoadError::malformed(row_no, "index value is not a number"))?;

        records.push(IndexRecord {
            year,
            stock_code,
            company_name,
            index_value,
        });
    }

    Ok(IndexTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat-column Parquet:
/// - year: Int32/Int64
/// - stock_code: Utf8 (numeric columns are coerced to text)
/// - company_name: Utf8
/// - index_value: Float64/Float32
fn load_parquet(path: &Path) -> Result<IndexTable, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        let year_idx =
            find_header(&names, YEAR_ALIASES).ok_or(LoadError::MissingColumn(COL_YEAR))?;
        let code_idx =
            find_header(&names, CODE_ALIASES).ok_or(LoadError::MissingColumn(COL_CODE))?;
        let name_idx =
            find_header(&names, NAME_ALIASES).ok_or(LoadError::MissingColumn(COL_NAME))?;
        let index_idx =
            find_header(&names, INDEX_ALIASES).ok_or(LoadError::MissingColumn(COL_INDEX))?;

        for row in 0..batch.num_rows() {
            records.push(IndexRecord {
                year: cell_as_i32(batch.column(year_idx), row)
                    .ok_or_else(|| LoadError::malformed(row, "bad year cell"))?,
                stock_code: cell_as_string(batch.column(code_idx), row)
                    .ok_or_else(|| LoadError::malformed(row, "bad stock code cell"))?,
                company_name: cell_as_string(batch.column(name_idx), row)
                    .ok_or_else(|| LoadError::malformed(row, "bad company name cell"))?,
                index_value: cell_as_f64(batch.column(index_idx), row)
                    .ok_or_else(|| LoadError::malformed(row, "bad index value cell"))?,
            });
        }
    }

    Ok(IndexTable::from_records(records))
}

// -- Arrow cell helpers --

fn cell_as_i32(col: &Arc<dyn Array>, row: usize) -> Option<i32> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => Some(col.as_any().downcast_ref::<Int32Array>()?.value(row)),
        DataType::Int64 => {
            i32::try_from(col.as_any().downcast_ref::<Int64Array>()?.value(row)).ok()
        }
        _ => None,
    }
}

fn cell_as_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(
            col.as_any()
                .downcast_ref::<StringArray>()?
                .value(row)
                .trim()
                .to_string(),
        ),
        DataType::LargeUtf8 => Some(
            col.as_any()
                .downcast_ref::<LargeStringArray>()?
                .value(row)
                .trim()
                .to_string(),
        ),
        DataType::Int32 => Some(
            col.as_any()
                .downcast_ref::<Int32Array>()?
                .value(row)
                .to_string(),
        ),
        DataType::Int64 => Some(
            col.as_any()
                .downcast_ref::<Int64Array>()?
                .value(row)
                .to_string(),
        ),
        _ => None,
    }
}

fn cell_as_f64(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => Some(col.as_any().downcast_ref::<Float64Array>()?.value(row)),
        DataType::Float32 => Some(col.as_any().downcast_ref::<Float32Array>()?.value(row) as f64),
        DataType::Int32 => Some(col.as_any().downcast_ref::<Int32Array>()?.value(row) as f64),
        DataType::Int64 => Some(col.as_any().downcast_ref::<Int64Array>()?.value(row) as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn loads_csv_with_english_headers() {
        let file = write_fixture(
            ".csv",
            "year,stock_code,company_name,index_value\n\
             2000,600016,B Bank,-0.80\n\
             1999,600000,A Bank,1.23\n",
        );
        let table = load_file(file.path()).expect("load csv");
        assert_eq!(table.len(), 2);
        // Sorted by year ascending after load.
        assert_eq!(table.records[0].year, 1999);
        assert_eq!(table.records[0].company_name, "A Bank");
        assert_eq!(table.records[1].index_value, -0.80);
        assert_eq!(table.years, vec![1999, 2000]);
    }

    #[test]
    fn loads_csv_with_chinese_headers() {
        let file = write_fixture(
            ".csv",
            "年份,股票代码,企业名称,数字化转型指数\n\
             2020,600000,浦发银行,35.67\n",
        );
        let table = load_file(file.path()).expect("load csv");
        assert_eq!(table.records[0].stock_code, "600000");
        assert_eq!(table.records[0].company_name, "浦发银行");
        assert_eq!(table.records[0].index_value, 35.67);
    }

    #[test]
    fn csv_missing_column_is_load_error() {
        let file = write_fixture(".csv", "year,stock_code,index_value\n2020,600000,1.0\n");
        match load_file(file.path()) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "company_name"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn csv_float_year_is_accepted_when_integral() {
        let file = write_fixture(
            ".csv",
            "year,stock_code,company_name,index_value\n2020.0,600000,A Bank,1.0\n",
        );
        let table = load_file(file.path()).expect("load csv");
        assert_eq!(table.records[0].year, 2020);
    }

    #[test]
    fn csv_bad_index_value_is_malformed() {
        let file = write_fixture(
            ".csv",
            "year,stock_code,company_name,index_value\n2020,600000,A Bank,high\n",
        );
        assert!(matches!(
            load_file(file.path()),
            Err(LoadError::Malformed { row: 0, .. })
        ));
    }

    #[test]
    fn loads_json_and_coerces_numeric_codes() {
        let file = write_fixture(
            ".json",
            r#"[
                {"year": 2020, "stock_code": 600000, "company_name": "A Bank", "index_value": 1.5},
                {"year": 2019, "stock_code": "600016", "company_name": "B Bank", "index_value": 2.0}
            ]"#,
        );
        let table = load_file(file.path()).expect("load json");
        assert_eq!(table.records[0].year, 2019);
        assert_eq!(table.records[1].stock_code, "600000");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_fixture(".xlsx", "not really a spreadsheet");
        assert!(matches!(
            load_file(file.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }
}
