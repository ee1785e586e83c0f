use std::collections::BTreeMap;

use super::model::MovieRecord;

// ---------------------------------------------------------------------------
// Summaries over a set of movies (usually a filtered view)
// ---------------------------------------------------------------------------

/// Headline numbers for the metrics row. Means are `None` for no movies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryMetrics {
    pub count: usize,
    pub mean_budget: Option<f64>,
    pub mean_gross: Option<f64>,
    pub mean_score: Option<f64>,
}

pub fn summary_metrics<'a>(movies: impl IntoIterator<Item = &'a MovieRecord>) -> SummaryMetrics {
    let mut count = 0usize;
    let (mut budget, mut gross, mut score) = (0.0, 0.0, 0.0);
    for m in movies {
        count += 1;
        budget += m.budget;
        gross += m.gross;
        score += m.score;
    }
    let mean = |total: f64| (count > 0).then(|| total / count as f64);
    SummaryMetrics {
        count,
        mean_budget: mean(budget),
        mean_gross: mean(gross),
        mean_score: mean(score),
    }
}

/// The `n` best-scored movies, highest first. Ties keep input order.
pub fn top_n_by_score<'a>(
    movies: impl IntoIterator<Item = &'a MovieRecord>,
    n: usize,
) -> Vec<&'a MovieRecord> {
    let mut sorted: Vec<&MovieRecord> = movies.into_iter().collect();
    // `sort_by` is stable.
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted.truncate(n);
    sorted
}

/// Average budget per release year, ascending by year.
pub fn mean_budget_by_year<'a>(
    movies: impl IntoIterator<Item = &'a MovieRecord>,
) -> BTreeMap<i32, f64> {
    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for m in movies {
        let entry = sums.entry(m.year).or_insert((0.0, 0));
        entry.0 += m.budget;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(year, (total, n))| (year, total / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Score distribution
// ---------------------------------------------------------------------------

/// One equal-width histogram bin over `[start, end)` (last bin closed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Bin scores into `bins` equal-width bins spanning the observed range.
pub fn score_histogram<'a>(
    movies: impl IntoIterator<Item = &'a MovieRecord>,
    bins: usize,
) -> Vec<HistogramBin> {
    let scores: Vec<f64> = movies.into_iter().map(|m| m.score).collect();
    if scores.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: scores.len(),
        }];
    }

    let width = range / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for s in scores {
        let idx = (((s - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Gaussian kernel density estimate of the scores with Scott's bandwidth,
/// sampled at `samples` evenly spaced points spanning three bandwidths past
/// the observed range. Values integrate to 1.
pub fn score_density<'a>(
    movies: impl IntoIterator<Item = &'a MovieRecord>,
    samples: usize,
) -> Vec<[f64; 2]> {
    let scores: Vec<f64> = movies.into_iter().map(|m| m.score).collect();
    let n = scores.len();
    if n < 2 || samples < 2 {
        return Vec::new();
    }

    let mean = scores.iter().sum::<f64>() / n as f64;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev < f64::EPSILON {
        return Vec::new();
    }
    let bandwidth = std_dev * (n as f64).powf(-0.2);

    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (max - min) / (samples - 1) as f64;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..samples)
        .map(|i| {
            let x = min + i as f64 * step;
            let density: f64 = scores
                .iter()
                .map(|s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                .sum();
            [x, density * norm]
        })
        .collect()
}
