use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::clean::clean;
use super::error::{DataResult, DataSourceError};
use super::model::{normalize_cell, MovieTable, RawTable};

// ---------------------------------------------------------------------------
// Where a dataset comes from
// ---------------------------------------------------------------------------

/// Public movie dataset used when nothing else is configured.
pub const DEFAULT_DATA_URL: &str = "https://raw.githubusercontent.com/nv-thang/Data-Visualization-Course/main/Dataset%20for%20Practice/movies.csv";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataSource {
    /// CSV over HTTP(S).
    Remote(String),
    /// Local `.csv`, `.json` or `.parquet` file.
    File(PathBuf),
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Remote(DEFAULT_DATA_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Network behaviour of a remote fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Pause before each retry.
    pub backoff: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            timeout: Duration::from_secs(30),
            retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read the untouched source table.
pub fn load(source: &DataSource, options: &FetchOptions) -> DataResult<RawTable> {
    let raw = match source {
        DataSource::Remote(url) => fetch_remote(url, options)?,
        DataSource::File(path) => load_file(path)?,
    };
    log::info!(
        "Read {} rows with columns {:?} from {source}",
        raw.len(),
        raw.headers
    );
    Ok(raw)
}

/// Load and clean a source, bypassing the cache.
pub fn load_table(source: &DataSource, options: &FetchOptions) -> DataResult<Arc<MovieTable>> {
    let raw = load(source, options)?;
    let cleaned = clean(&raw)?;
    log::info!(
        "Cleaned table: {} movies, {} genres, {} rows dropped",
        cleaned.table.len(),
        cleaned.table.genre_vocabulary.len(),
        cleaned.dropped.len()
    );
    Ok(Arc::new(cleaned.table))
}

/// Cleaned tables already built in this process, by source.
static TABLE_CACHE: Mutex<BTreeMap<DataSource, Arc<MovieTable>>> = Mutex::new(BTreeMap::new());

/// Load and clean a source once per process; later calls share the same table.
/// Failed loads are not remembered.
pub fn load_shared(source: &DataSource, options: &FetchOptions) -> DataResult<Arc<MovieTable>> {
    if let Some(table) = cache().get(source) {
        log::debug!("Using cached table for {source}");
        return Ok(Arc::clone(table));
    }
    let table = load_table(source, options)?;
    Ok(Arc::clone(
        cache().entry(source.clone()).or_insert(table),
    ))
}

/// Load a source again and replace whatever the cache held for it.
pub fn reload(source: &DataSource, options: &FetchOptions) -> DataResult<Arc<MovieTable>> {
    let table = load_table(source, options)?;
    cache().insert(source.clone(), Arc::clone(&table));
    Ok(table)
}

fn cache() -> std::sync::MutexGuard<'static, BTreeMap<DataSource, Arc<MovieTable>>> {
    TABLE_CACHE.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Remote CSV
// ---------------------------------------------------------------------------

fn fetch_remote(url: &str, options: &FetchOptions) -> DataResult<RawTable> {
    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .build()?;

    let body = with_retry(options.retries, options.backoff, |attempt| {
        log::info!("Fetching {url} (attempt {})", attempt + 1);
        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?)
    })?;

    parse_csv(&body[..])
}

/// Run `op` up to `retries + 1` times, returning the first success or the
/// last error. `op` receives the zero-based attempt number.
pub fn with_retry<T>(
    retries: u32,
    backoff: Duration,
    mut op: impl FnMut(u32) -> DataResult<T>,
) -> DataResult<T> {
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries => {
                log::warn!("Attempt {} failed: {e}; retrying", attempt + 1);
                attempt += 1;
                if !backoff.is_zero() {
                    std::thread::sleep(backoff);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one movie per line
/// * `.json`    – `[{ "name": ..., "year": ..., ... }, ...]`
/// * `.parquet` – one column per field
pub fn load_file(path: &Path) -> DataResult<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(std::fs::File::open(path)?),
        "json" => Ok(load_json(path)?),
        "parquet" | "pq" => Ok(load_parquet(path)?),
        other => Err(DataSourceError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse CSV with a header row. Every row must have as many fields as the
/// header.
pub fn parse_csv<R: Read>(reader: R) -> DataResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        raw.rows.push(record.iter().map(normalize_cell).collect());
    }
    Ok(raw)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`).
/// Columns are the union of keys in first-seen order.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut raw = RawTable::new(headers);
    for rec in records {
        // Already checked above.
        let Some(obj) = rec.as_object() else { continue };
        let row = raw
            .headers
            .iter()
            .map(|h| obj.get(h).and_then(json_to_cell))
            .collect();
        raw.rows.push(row);
    }
    Ok(raw)
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => normalize_cell(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Load a Parquet file, rendering every cell to text so it goes through the
/// same cleaning as CSV. Arrow nulls become missing cells.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut raw = RawTable::new(headers);
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(batch.num_columns());
            for (col_idx, col) in batch.columns().iter().enumerate() {
                if col.is_null(row) {
                    cells.push(None);
                    continue;
                }
                let text = array_value_to_string(col, row).with_context(|| {
                    format!("Row {row}: failed to read '{}'", raw.headers[col_idx])
                })?;
                cells.push(normalize_cell(&text));
            }
            raw.rows.push(cells);
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const MOVIES_CSV: &str = "\
name,rating,genre,year,score,director,budget,gross
The Shining,R,Drama,1980,8.4,Stanley Kubrick,19000000,46998772
The Blue Lagoon,R,Adventure,1980,5.8,Randal Kleiser,4500000,58853106
Missing Gross,PG,Comedy,1981,6.1,Someone,1000000,
Odd Year,PG,Comedy,19x1,6.1,Someone,1000000,2000000
";

    #[test]
    fn test_parse_csv_keeps_missing_cells() {
        let raw = parse_csv(MOVIES_CSV.as_bytes()).unwrap();
        assert_eq!(
            raw.headers,
            vec!["name", "rating", "genre", "year", "score", "director", "budget", "gross"]
        );
        assert_eq!(raw.len(), 4);
        assert_eq!(raw.rows[0][0].as_deref(), Some("The Shining"));
        assert_eq!(raw.rows[2][7], None);
    }

    #[test]
    fn test_csv_through_cleaning() {
        let raw = parse_csv(MOVIES_CSV.as_bytes()).unwrap();
        let cleaned = crate::data::clean::clean(&raw).unwrap();
        assert_eq!(cleaned.table.len(), 2);
        assert_eq!(cleaned.dropped.len(), 2);
        let shining = &cleaned.table.records[0];
        assert!((shining.budget - 19.0).abs() < 1e-9);
        assert_eq!(
            cleaned.table.extra_columns,
            vec!["rating".to_string(), "director".to_string()]
        );
    }

    #[test]
    fn test_ragged_csv_is_rejected() {
        let text = "name,year\nA,2000,extra\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DataSourceError::Csv(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("movies.xlsx")).unwrap_err();
        assert!(matches!(err, DataSourceError::UnsupportedExtension(e) if e == "xlsx"));
    }

    #[test]
    fn test_retry_stops_at_first_success() {
        let mut calls = 0;
        let result = with_retry(3, Duration::ZERO, |attempt| {
            calls += 1;
            if attempt == 0 {
                Err(DataSourceError::MissingColumn("x".to_string()))
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_retry_gives_up_after_limit() {
        let mut calls = 0;
        let result: DataResult<()> = with_retry(1, Duration::ZERO, |_| {
            calls += 1;
            Err(DataSourceError::Status {
                url: "http://example.invalid".to_string(),
                status: 503,
            })
        });
        assert!(matches!(result, Err(DataSourceError::Status { status: 503, .. })));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"name": "The Shining", "year": 1980, "genre": "Drama", "score": 8.4, "budget": 19000000, "gross": 46998772}},
                {{"name": "No Budget", "year": 1981, "genre": "Comedy", "score": 6.0, "budget": null, "gross": 10}}
            ]"#
        )
        .unwrap();

        let raw = load_file(file.path()).unwrap();
        assert_eq!(raw.headers.len(), 6);
        let budget = raw.column_index("budget").unwrap();
        assert_eq!(raw.rows[1][budget], None);

        let cleaned = crate::data::clean::clean(&raw).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.table.records[0].year, 1980);
    }

    #[test]
    fn test_json_rejects_non_array() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"name": "x"}}"#).unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DataSourceError::Malformed(_)));
    }

    #[test]
    fn test_parquet_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("genre", DataType::Utf8, false),
            Field::new("score", DataType::Float64, false),
            Field::new("budget", DataType::Float64, true),
            Field::new("gross", DataType::Float64, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["Heist", "Ghost"])),
            Arc::new(Int64Array::from(vec![2019, 2020])),
            Arc::new(StringArray::from(vec!["Action, Drama", "Horror"])),
            Arc::new(Float64Array::from(vec![7.5, 5.0])),
            Arc::new(Float64Array::from(vec![Some(10_000_000.0), None])),
            Arc::new(Float64Array::from(vec![50_000_000.0, 1_000_000.0])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(out, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let raw = load_file(file.path()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows[1][4], None);

        let cleaned = crate::data::clean::clean(&raw).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        let heist = &cleaned.table.records[0];
        assert_eq!(heist.year, 2019);
        assert!((heist.gross - 50.0).abs() < 1e-9);
        assert!((heist.roi.unwrap() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_table_is_built_once() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(MOVIES_CSV.as_bytes()).unwrap();
        let source = DataSource::File(file.path().to_path_buf());
        let options = FetchOptions::default();

        let first = load_shared(&source, &options).unwrap();
        let second = load_shared(&source, &options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let fresh = reload(&source, &options).unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert!(Arc::ptr_eq(&fresh, &load_shared(&source, &options).unwrap()));
    }
}
