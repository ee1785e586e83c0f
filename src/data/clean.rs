use std::collections::BTreeMap;

use chrono::Datelike;

use super::error::{DataResult, DataSourceError};
use super::model::{
    split_genres, DropReason, MovieRecord, MovieTable, RawTable, RowDropped, MILLION,
};

/// Earliest release year accepted as plausible.
pub const EARLIEST_YEAR: i32 = 1800;

/// How many years past the current one a release year may lie.
const FUTURE_YEAR_SLACK: i32 = 5;

/// Output of [`clean`]: the table plus a record of every excluded row.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: MovieTable,
    pub dropped: Vec<RowDropped>,
}

/// Source column positions needed to build a [`MovieRecord`].
struct Columns {
    title: usize,
    year: usize,
    genre: usize,
    score: usize,
    budget: usize,
    gross: usize,
    /// (index, name) of every other column.
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn locate(raw: &RawTable) -> DataResult<Self> {
        let find = |name: &str| {
            raw.column_index(name)
                .ok_or_else(|| DataSourceError::MissingColumn(name.to_string()))
        };
        let title = raw
            .column_index("name")
            .or_else(|| raw.column_index("title"))
            .ok_or_else(|| DataSourceError::MissingColumn("name".to_string()))?;
        let year = find("year")?;
        let genre = find("genre")?;
        let score = find("score")?;
        let budget = find("budget")?;
        let gross = find("gross")?;

        let used = [title, year, genre, score, budget, gross];
        let extra = raw
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(Columns {
            title,
            year,
            genre,
            score,
            budget,
            gross,
            extra,
        })
    }
}

/// Clean a raw table into a [`MovieTable`].
///
/// Rows with any missing cell are dropped whole, years must be a 4-digit
/// calendar year in `[1800, current year + 5]`, then `profit` and `roi` are
/// derived and the money columns rescaled to millions.
pub fn clean(raw: &RawTable) -> DataResult<Cleaned> {
    clean_until(raw, chrono::Local::now().year() + FUTURE_YEAR_SLACK)
}

/// [`clean`] with an explicit latest acceptable year.
pub fn clean_until(raw: &RawTable, latest_year: i32) -> DataResult<Cleaned> {
    let cols = Columns::locate(raw)?;

    let mut records = Vec::with_capacity(raw.len());
    let mut dropped = Vec::new();

    for (row_no, row) in raw.rows.iter().enumerate() {
        match clean_row(raw, &cols, row, latest_year) {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::debug!("Dropping row {row_no}: {reason}");
                dropped.push(RowDropped {
                    row: row_no,
                    reason,
                });
            }
        }
    }

    if !dropped.is_empty() {
        log::info!(
            "Cleaning kept {} of {} rows ({} dropped)",
            records.len(),
            raw.len(),
            dropped.len()
        );
    }

    let extra_columns = cols.extra.iter().map(|(_, name)| name.clone()).collect();
    Ok(Cleaned {
        table: MovieTable::new(records, extra_columns),
        dropped,
    })
}

fn clean_row(
    raw: &RawTable,
    cols: &Columns,
    row: &[Option<String>],
    latest_year: i32,
) -> Result<MovieRecord, DropReason> {
    // Step 1: all-or-nothing null policy over every column.
    let mut cells: Vec<&str> = Vec::with_capacity(raw.headers.len());
    for (i, header) in raw.headers.iter().enumerate() {
        match row.get(i).and_then(|c| c.as_deref()) {
            Some(value) => cells.push(value),
            None => {
                return Err(DropReason::MissingField {
                    column: header.clone(),
                })
            }
        }
    }

    // A genre cell of only separators carries no genre at all.
    if split_genres(cells[cols.genre]).next().is_none() {
        return Err(DropReason::MissingField {
            column: raw.headers[cols.genre].clone(),
        });
    }

    // Step 2: calendar year.
    let year_cell = cells[cols.year];
    let year = parse_year(year_cell).ok_or_else(|| DropReason::UnparsableYear {
        value: year_cell.to_string(),
    })?;
    if !(EARLIEST_YEAR..=latest_year).contains(&year) {
        return Err(DropReason::YearOutOfRange { year });
    }

    let number = |idx: usize| -> Result<f64, DropReason> {
        let cell = cells[idx];
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DropReason::InvalidNumber {
                column: raw.headers[idx].clone(),
                value: cell.to_string(),
            })
    };
    let score = number(cols.score)?;
    let budget = number(cols.budget)?;
    let gross = number(cols.gross)?;

    // Steps 3–5: derived columns on source units, then rescale.
    let profit = gross - budget;
    let roi = return_on_investment(profit, budget);

    let extra: BTreeMap<String, String> = cols
        .extra
        .iter()
        .map(|(i, name)| (name.clone(), cells[*i].to_string()))
        .collect();

    Ok(MovieRecord {
        title: cells[cols.title].to_string(),
        year,
        genre: cells[cols.genre].to_string(),
        score,
        budget: budget / MILLION,
        gross: gross / MILLION,
        profit: profit / MILLION,
        roi,
        extra,
    })
}

/// Parse a 4-digit year. Accepts `"1980"` and the float form `"1980.0"`.
pub fn parse_year(s: &str) -> Option<i32> {
    let digits = s.strip_suffix(".0").unwrap_or(s);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `profit / budget * 100`, or `None` when undefined.
pub fn return_on_investment(profit: f64, budget: f64) -> Option<f64> {
    if budget == 0.0 {
        return None;
    }
    let roi = profit / budget * 100.0;
    roi.is_finite().then_some(roi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::normalize_cell;

    const TOL: f64 = 1e-9;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.rows.push(row.iter().map(|c| normalize_cell(c)).collect());
        }
        table
    }

    const HEADERS: &[&str] = &["name", "year", "genre", "score", "budget", "gross", "director"];

    #[test]
    fn test_end_to_end_example_row() {
        let input = raw(
            HEADERS,
            &[&["Heist", "2019", "Action, Drama", "7.5", "10000000", "50000000", "Nolan"]],
        );
        let cleaned = clean_until(&input, 2030).unwrap();
        assert!(cleaned.dropped.is_empty());

        let m = &cleaned.table.records[0];
        assert_eq!(m.title, "Heist");
        assert_eq!(m.year, 2019);
        assert!((m.budget - 10.0).abs() < TOL);
        assert!((m.gross - 50.0).abs() < TOL);
        assert!((m.profit - 40.0).abs() < TOL);
        assert!((m.roi.unwrap() - 400.0).abs() < TOL);
        assert_eq!(m.extra.get("director").map(String::as_str), Some("Nolan"));
        assert_eq!(cleaned.table.extra_columns, vec!["director".to_string()]);
    }

    #[test]
    fn test_missing_value_in_any_column_drops_row() {
        let input = raw(
            HEADERS,
            &[
                &["A", "2000", "Drama", "6.0", "100", "200", ""],
                &["B", "2000", "Drama", "NaN", "100", "200", "X"],
                &["C", "2000", "Drama", "6.0", "100", "200", "Y"],
            ],
        );
        let cleaned = clean_until(&input, 2030).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.table.records[0].title, "C");
        assert_eq!(
            cleaned.dropped,
            vec![
                RowDropped {
                    row: 0,
                    reason: DropReason::MissingField {
                        column: "director".to_string()
                    }
                },
                RowDropped {
                    row: 1,
                    reason: DropReason::MissingField {
                        column: "score".to_string()
                    }
                },
            ]
        );
    }

    #[test]
    fn test_separator_only_genre_counts_as_missing() {
        let input = raw(
            HEADERS,
            &[
                &["A", "2000", ",", "6.0", "100", "200", "d"],
                &["B", "2001", " , ", "6.0", "100", "200", "d"],
                &["C", "2002", "Drama", "7.0", "100", "200", "d"],
            ],
        );
        let cleaned = clean_until(&input, 2030).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.table.records[0].title, "C");
        let missing_genre = DropReason::MissingField {
            column: "genre".to_string(),
        };
        assert_eq!(cleaned.dropped.len(), 2);
        assert!(cleaned.dropped.iter().all(|d| d.reason == missing_genre));
    }

    #[test]
    fn test_short_row_counts_as_missing() {
        let mut input = raw(HEADERS, &[]);
        input.rows.push(vec![Some("A".to_string()), Some("2000".to_string())]);
        let cleaned = clean_until(&input, 2030).unwrap();
        assert!(cleaned.table.is_empty());
        assert!(matches!(
            cleaned.dropped[0].reason,
            DropReason::MissingField { .. }
        ));
    }

    #[test]
    fn test_year_parsing_and_range() {
        let input = raw(
            HEADERS,
            &[
                &["A", "19x5", "Drama", "6.0", "100", "200", "d"],
                &["B", "1750", "Drama", "6.0", "100", "200", "d"],
                &["C", "2099", "Drama", "6.0", "100", "200", "d"],
                &["D", "1985.0", "Drama", "6.0", "100", "200", "d"],
                &["E", "85", "Drama", "6.0", "100", "200", "d"],
            ],
        );
        let cleaned = clean_until(&input, 2030).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.table.records[0].year, 1985);

        let reasons: Vec<&DropReason> = cleaned.dropped.iter().map(|d| &d.reason).collect();
        assert!(matches!(reasons[0], DropReason::UnparsableYear { value } if value == "19x5"));
        assert_eq!(reasons[1], &DropReason::YearOutOfRange { year: 1750 });
        assert_eq!(reasons[2], &DropReason::YearOutOfRange { year: 2099 });
        assert!(matches!(reasons[3], DropReason::UnparsableYear { .. }));
    }

    #[test]
    fn test_non_numeric_money_is_dropped() {
        let input = raw(HEADERS, &[&["A", "2000", "Drama", "6.0", "lots", "200", "d"]]);
        let cleaned = clean_until(&input, 2030).unwrap();
        assert!(cleaned.table.is_empty());
        assert_eq!(
            cleaned.dropped[0].reason,
            DropReason::InvalidNumber {
                column: "budget".to_string(),
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_zero_budget_roi_is_undefined() {
        let input = raw(HEADERS, &[&["Free", "2001", "Drama", "5.0", "0", "3000000", "d"]]);
        let cleaned = clean_until(&input, 2030).unwrap();
        let m = &cleaned.table.records[0];
        assert_eq!(m.roi, None);
        assert!((m.profit - 3.0).abs() < TOL);
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let input = raw(&["name", "year", "genre", "score", "budget"], &[]);
        let err = clean_until(&input, 2030).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(c) if c == "gross"));
    }

    #[test]
    fn test_title_column_fallback() {
        let input = raw(
            &["title", "year", "genre", "score", "budget", "gross"],
            &[&["Alt", "2010", "Drama", "6.0", "1000000", "2000000"]],
        );
        let cleaned = clean_until(&input, 2030).unwrap();
        assert_eq!(cleaned.table.records[0].title, "Alt");
        assert!(cleaned.table.extra_columns.is_empty());
    }

    #[test]
    fn test_derived_columns_hold_for_every_row() {
        let input = raw(
            HEADERS,
            &[
                &["A", "1999", "Drama", "6.1", "25000000", "12500000", "d"],
                &["B", "2003", "Comedy", "7.9", "3300000", "91000000", "d"],
                &["C", "2011", "Horror", "4.4", "750000", "750000", "d"],
            ],
        );
        let cleaned = clean_until(&input, 2030).unwrap();
        for m in &cleaned.table.records {
            assert!((m.profit - (m.gross - m.budget)).abs() < TOL);
            let roi = m.roi.unwrap();
            assert!((roi - m.profit / m.budget * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clean_is_idempotent() {
        let input = raw(
            HEADERS,
            &[
                &["A", "1999", "Drama, Crime", "6.1", "25000000", "12500000", "d1"],
                &["B", "2003", "Comedy", "7.9", "3300000", "91000000", "d2"],
                &["C", "2011", "Horror", "4.4", "0", "750000", "d3"],
            ],
        );
        let once = clean_until(&input, 2030).unwrap().table;
        let twice = clean_until(&once.to_raw(), 2030).unwrap();
        assert!(twice.dropped.is_empty());
        assert_eq!(twice.table.len(), once.len());
        assert_eq!(twice.table.extra_columns, once.extra_columns);
        assert_eq!(twice.table.genre_vocabulary, once.genre_vocabulary);
        for (a, b) in once.records.iter().zip(&twice.table.records) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.year, b.year);
            assert_eq!(a.genre, b.genre);
            assert_eq!(a.score, b.score);
            assert_eq!(a.extra, b.extra);
            assert!((a.budget - b.budget).abs() < TOL);
            assert!((a.gross - b.gross).abs() < TOL);
            assert!((a.profit - b.profit).abs() < TOL);
            match (a.roi, b.roi) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-6),
                (None, None) => {}
                other => panic!("roi mismatch: {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("+201"), None);
        assert_eq!(parse_year("20190"), None);
    }
}
