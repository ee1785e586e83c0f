use std::collections::BTreeSet;

use super::model::{MovieRecord, MovieTable};

// ---------------------------------------------------------------------------
// Filter parameters: the user's current selection, passed explicitly
// ---------------------------------------------------------------------------

/// Lowest and highest selectable rating.
pub const RATING_SCALE: (f64, f64) = (0.0, 10.0);

/// How many genres the dashboard pre-selects.
const INITIAL_GENRE_COUNT: usize = 3;

/// Year, genre and rating selection applied by [`filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Inclusive `(min, max)` release year.
    pub years: (i32, i32),
    /// Selected genres. An empty set matches no movie.
    pub genres: BTreeSet<String>,
    /// Inclusive `(min, max)` score.
    pub rating: (f64, f64),
}

impl FilterParams {
    /// Everything selected: the identity filter for scores within `[0, 10]`.
    pub fn full(table: &MovieTable) -> Self {
        FilterParams {
            years: table.year_bounds().unwrap_or((0, 0)),
            genres: table.genre_vocabulary.clone(),
            rating: RATING_SCALE,
        }
    }

    /// Dashboard defaults: all years, the first few genres, full rating scale.
    pub fn initial(table: &MovieTable) -> Self {
        FilterParams {
            genres: table
                .genre_vocabulary
                .iter()
                .take(INITIAL_GENRE_COUNT)
                .cloned()
                .collect(),
            ..Self::full(table)
        }
    }

    /// Whether a single movie passes all three predicates.
    pub fn matches(&self, movie: &MovieRecord) -> bool {
        let (min_year, max_year) = self.years;
        let (min_rating, max_rating) = self.rating;
        (min_year..=max_year).contains(&movie.year)
            && movie.has_any_genre(&self.genres)
            && min_rating <= movie.score
            && movie.score <= max_rating
    }
}

// ---------------------------------------------------------------------------
// MovieView – the filtered subset, borrowed from the table
// ---------------------------------------------------------------------------

/// Rows of a [`MovieTable`] passing a filter, in source order.
#[derive(Debug, Clone)]
pub struct MovieView<'a> {
    table: &'a MovieTable,
    indices: Vec<usize>,
}

impl<'a> MovieView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions of the matching rows within the source table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MovieRecord> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }
}

/// Return the movies passing `params`. The table is left untouched.
///
/// A movie passes when:
/// * its year lies within `params.years`
/// * at least one of its genres is selected (empty selection → nothing passes)
/// * its score lies within `params.rating`
pub fn filter<'a>(table: &'a MovieTable, params: &FilterParams) -> MovieView<'a> {
    let indices = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, movie)| params.matches(movie))
        .map(|(i, _)| i)
        .collect();
    MovieView { table, indices }
}
