use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::data::aggregate::{
    mean_budget_by_year, score_density, score_histogram, summary_metrics, top_n_by_score,
    HistogramBin, SummaryMetrics,
};
use crate::data::error::DataResult;
use crate::data::filter::{filter, FilterParams, MovieView};
use crate::data::loader::{self, DataSource};
use crate::data::model::MovieTable;

/// Number of histogram bins in the rating distribution chart.
pub const HISTOGRAM_BINS: usize = 20;
/// Number of movies in the "top rated" chart.
pub const TOP_N: usize = 10;
/// Sample points along the density curve.
const DENSITY_SAMPLES: usize = 200;

// ---------------------------------------------------------------------------
// Derived chart data for the current filter
// ---------------------------------------------------------------------------

/// Everything the charts need, recomputed whenever the filter changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub metrics: Option<SummaryMetrics>,
    pub histogram: Vec<HistogramBin>,
    /// Density curve scaled to histogram counts.
    pub density: Vec<[f64; 2]>,
    /// (title, score), best first.
    pub top_movies: Vec<(String, f64)>,
    /// (year, mean budget), ascending by year.
    pub budget_trend: Vec<(i32, f64)>,
}

impl Snapshot {
    pub fn from_view(view: &MovieView<'_>) -> Self {
        let histogram = score_histogram(view.iter(), HISTOGRAM_BINS);
        let bin_width = histogram.first().map(|b| b.width()).unwrap_or(1.0);
        let scale = view.len() as f64 * bin_width;
        let density = score_density(view.iter(), DENSITY_SAMPLES)
            .into_iter()
            .map(|[x, y]| [x, y * scale])
            .collect();

        Snapshot {
            metrics: Some(summary_metrics(view.iter())),
            histogram,
            density,
            top_movies: top_n_by_score(view.iter(), TOP_N)
                .into_iter()
                .map(|m| (m.title.clone(), m.score))
                .collect(),
            budget_trend: mean_budget_by_year(view.iter()).into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

type LoadOutcome = (DataSource, DataResult<Arc<MovieTable>>);

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Where the current table comes from; updated only once a load succeeds.
    pub source: DataSource,

    /// Cleaned dataset (None until a load succeeds).
    pub table: Option<Arc<MovieTable>>,

    /// Current year / genre / rating selection.
    pub filters: FilterParams,

    /// Indices of movies passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Chart data for `visible_indices` (cached).
    pub snapshot: Snapshot,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a load is in progress.
    pub loading: bool,

    /// When the current table arrived.
    pub loaded_at: Option<DateTime<Local>>,

    pending: Option<Receiver<LoadOutcome>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            source: config.source.clone(),
            config,
            table: None,
            filters: FilterParams {
                years: (0, 0),
                genres: BTreeSet::new(),
                rating: (0.0, 10.0),
            },
            visible_indices: Vec::new(),
            snapshot: Snapshot::default(),
            status_message: None,
            loading: false,
            loaded_at: None,
            pending: None,
        }
    }

    /// Start loading `source` on a background thread. With `force` the
    /// process-wide cache is bypassed and refreshed.
    pub fn start_load(&mut self, source: DataSource, force: bool) {
        let (tx, rx) = mpsc::channel();
        let options = self.config.fetch.clone();
        let job_source = source.clone();

        std::thread::spawn(move || {
            let result = if force {
                loader::reload(&job_source, &options)
            } else {
                loader::load_shared(&job_source, &options)
            };
            // The receiver is gone if a newer load replaced this one.
            let _ = tx.send((job_source, result));
        });

        log::info!("Loading movies from {source}");
        self.pending = Some(rx);
        self.loading = true;
        self.status_message = None;
    }

    /// Pick up a finished background load, if any.
    pub fn poll_load(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok((source, Ok(table))) => {
                log::info!("Loaded {} movies from {source}", table.len());
                self.pending = None;
                self.source = source;
                self.set_table(table);
            }
            Ok((source, Err(e))) => {
                log::error!("Failed to load {source}: {e}");
                self.pending = None;
                self.loading = false;
                self.status_message = Some(format!("Error: {e}"));
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::error!("Loader thread exited without a result");
                self.pending = None;
                self.loading = false;
                self.status_message = Some("Error: loading stopped unexpectedly".to_string());
            }
        }
    }

    /// Ingest a cleaned table and reset the filters to their defaults.
    pub fn set_table(&mut self, table: Arc<MovieTable>) {
        self.filters = FilterParams::initial(&table);
        self.table = Some(table);
        self.loaded_at = Some(Local::now());
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Recompute `visible_indices` and chart data after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            let view = filter(table, &self.filters);
            self.visible_indices = view.indices().to_vec();
            self.snapshot = Snapshot::from_view(&view);
        }
    }

    /// Replace the filters, refiltering only if something changed.
    pub fn update_filters(&mut self, mut params: FilterParams) {
        if params.years.0 > params.years.1 {
            params.years = (params.years.1, params.years.0);
        }
        if params.rating.0 > params.rating.1 {
            params.rating = (params.rating.1, params.rating.0);
        }
        if params != self.filters {
            self.filters = params;
            self.refilter();
        }
    }
}
