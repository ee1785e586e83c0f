use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// RawTable – the untouched source table
// ---------------------------------------------------------------------------

/// Source rows exactly as read, before any cleaning.
/// A cell is `None` when the source marks it as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names in source order.
    pub headers: Vec<String>,
    /// One entry per row, aligned with `headers`.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Markers treated as a missing value (mirrors the usual dataframe defaults).
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "#N/A", "#NA", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None",
    "<NA>", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN",
];

/// Trim a source cell and map missing-value markers to `None`.
pub fn normalize_cell(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        RawTable {
            headers,
            rows: Vec::new(),
        }
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A single cleaned movie. Monetary fields are in millions.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub year: i32,
    /// Comma-delimited genre string as found in the source.
    pub genre: String,
    pub score: f64,
    pub budget: f64,
    pub gross: f64,
    pub profit: f64,
    /// Return on investment in percent; `None` when the budget is zero.
    pub roi: Option<f64>,
    /// Remaining source columns: column_name → value.
    pub extra: BTreeMap<String, String>,
}

impl MovieRecord {
    /// Genre tokens, split fresh from the raw string on every call.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        split_genres(&self.genre)
    }

    /// Whether this movie carries at least one of `selected`.
    pub fn has_any_genre(&self, selected: &BTreeSet<String>) -> bool {
        self.genres().any(|g| selected.contains(g))
    }
}

/// Split a delimited genre string into trimmed, non-empty tokens.
pub fn split_genres(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|g| !g.is_empty())
}

// ---------------------------------------------------------------------------
// MovieTable – the cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned, immutable dataset with a pre-computed genre vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieTable {
    /// All movies in source order.
    pub records: Vec<MovieRecord>,
    /// Names of the pass-through columns, in source order.
    pub extra_columns: Vec<String>,
    /// Every distinct genre token across the table, sorted.
    pub genre_vocabulary: BTreeSet<String>,
}

impl MovieTable {
    pub fn new(records: Vec<MovieRecord>, extra_columns: Vec<String>) -> Self {
        let genre_vocabulary = records
            .iter()
            .flat_map(|r| r.genres().map(str::to_string))
            .collect();
        MovieTable {
            records,
            extra_columns,
            genre_vocabulary,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest release year.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Lowest and highest score.
    pub fn score_bounds(&self) -> Option<(f64, f64)> {
        if self.records.is_empty() {
            return None;
        }
        let min = self.records.iter().map(|r| r.score).fold(f64::INFINITY, f64::min);
        let max = self
            .records
            .iter()
            .map(|r| r.score)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    /// Express the table in source units again (years as text, money in
    /// whole currency units). Cleaning the result reproduces this table.
    pub fn to_raw(&self) -> RawTable {
        let mut headers: Vec<String> = ["name", "year", "genre", "score", "budget", "gross"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        headers.extend(self.extra_columns.iter().cloned());

        let mut raw = RawTable::new(headers);
        for r in &self.records {
            let mut row = vec![
                Some(r.title.clone()),
                Some(r.year.to_string()),
                Some(r.genre.clone()),
                Some(r.score.to_string()),
                Some((r.budget * MILLION).to_string()),
                Some((r.gross * MILLION).to_string()),
            ];
            row.extend(self.extra_columns.iter().map(|c| r.extra.get(c).cloned()));
            raw.rows.push(row);
        }
        raw
    }
}

/// Currency units per displayed unit.
pub const MILLION: f64 = 1_000_000.0;

// ---------------------------------------------------------------------------
// RowDropped – why a source row did not survive cleaning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// A cell was empty or a missing-value marker.
    MissingField { column: String },
    /// The year cell is not a 4-digit calendar year.
    UnparsableYear { value: String },
    /// The year parsed but falls outside the plausible range.
    YearOutOfRange { year: i32 },
    /// A numeric column holds something that is not a number.
    InvalidNumber { column: String, value: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingField { column } => write!(f, "missing value in '{column}'"),
            DropReason::UnparsableYear { value } => write!(f, "unparsable year '{value}'"),
            DropReason::YearOutOfRange { year } => write!(f, "year {year} out of range"),
            DropReason::InvalidNumber { column, value } => {
                write!(f, "'{value}' in '{column}' is not a number")
            }
        }
    }
}

/// A source row excluded during cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDropped {
    /// Zero-based data row index (header excluded).
    pub row: usize,
    pub reason: DropReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, year: i32, genre: &str, score: f64) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            year,
            genre: genre.to_string(),
            score,
            budget: 1.0,
            gross: 2.0,
            profit: 1.0,
            roi: Some(100.0),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_normalize_cell() {
        assert_eq!(normalize_cell("  Drama "), Some("Drama".to_string()));
        assert_eq!(normalize_cell(""), None);
        assert_eq!(normalize_cell("   "), None);
        assert_eq!(normalize_cell("NaN"), None);
        assert_eq!(normalize_cell("<NA>"), None);
        assert_eq!(normalize_cell("0"), Some("0".to_string()));
    }

    #[test]
    fn test_split_genres() {
        let tokens: Vec<&str> = split_genres("Action, Drama,,  Sci-Fi ").collect();
        assert_eq!(tokens, vec!["Action", "Drama", "Sci-Fi"]);
    }

    #[test]
    fn test_vocabulary_and_bounds() {
        let table = MovieTable::new(
            vec![
                movie("A", 1999, "Drama, Action", 6.0),
                movie("B", 2004, "Comedy", 8.5),
                movie("C", 1980, "Drama", 4.2),
            ],
            Vec::new(),
        );
        let vocab: Vec<&str> = table.genre_vocabulary.iter().map(String::as_str).collect();
        assert_eq!(vocab, vec!["Action", "Comedy", "Drama"]);
        assert_eq!(table.year_bounds(), Some((1980, 2004)));
        assert_eq!(table.score_bounds(), Some((4.2, 8.5)));
    }

    #[test]
    fn test_empty_table_has_no_bounds() {
        let table = MovieTable::default();
        assert!(table.is_empty());
        assert_eq!(table.year_bounds(), None);
        assert_eq!(table.score_bounds(), None);
    }

    #[test]
    fn test_has_any_genre_is_token_based() {
        let m = movie("A", 2000, "Science Fiction, Drama", 5.0);
        let fiction: BTreeSet<String> = ["Fiction".to_string()].into();
        let drama: BTreeSet<String> = ["Drama".to_string()].into();
        assert!(!m.has_any_genre(&fiction));
        assert!(m.has_any_genre(&drama));
        assert!(!m.has_any_genre(&BTreeSet::new()));
    }
}
