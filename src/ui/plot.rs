use eframe::egui::{Align2, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoint, Points, Text};

use crate::color::{sequential_palette, ColorScale};
use crate::data::filter::RATING_SCALE;
use crate::data::model::MovieTable;
use crate::format;
use crate::state::Snapshot;

const CHART_HEIGHT: f32 = 320.0;
const HISTOGRAM_FILL: Color32 = Color32::from_rgb(31, 119, 180);
const TREND_COLOR: Color32 = Color32::from_rgb(128, 0, 128);
/// Colour buckets in the budget/gross scatter.
const SCATTER_BUCKETS: usize = 8;

/// Returns false (after drawing a note) when there is nothing to plot.
fn has_rows(ui: &mut Ui, n: usize) -> bool {
    if n == 0 {
        ui.label(RichText::new("No movies match the current filters.").italics());
    }
    n > 0
}

// ---------------------------------------------------------------------------
// Rating distribution
// ---------------------------------------------------------------------------

pub fn score_distribution(ui: &mut Ui, snapshot: &Snapshot) {
    ui.heading("Rating distribution");
    if !has_rows(ui, snapshot.histogram.len()) {
        return;
    }

    let bars: Vec<Bar> = snapshot
        .histogram
        .iter()
        .map(|bin| {
            Bar::new(bin.center(), bin.count as f64)
                .width(bin.width())
                .fill(HISTOGRAM_FILL)
                .name(format!("{:.2}–{:.2}", bin.start, bin.end))
        })
        .collect();

    Plot::new("score_distribution")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Rating")
        .y_axis_label("Movies")
        .allow_scroll(false)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Movies"));
            if !snapshot.density.is_empty() {
                plot_ui.line(
                    Line::new(snapshot.density.clone())
                        .name("Density")
                        .color(HISTOGRAM_FILL.gamma_multiply(0.7))
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Top rated
// ---------------------------------------------------------------------------

pub fn top_rated(ui: &mut Ui, snapshot: &Snapshot) {
    ui.heading(format!("Top {} movies by rating", snapshot.top_movies.len()));
    if !has_rows(ui, snapshot.top_movies.len()) {
        return;
    }

    let n = snapshot.top_movies.len();
    // Best movie on top: row `i` is drawn at y = n - 1 - i.
    let palette = sequential_palette(n);
    let bars: Vec<Bar> = snapshot
        .top_movies
        .iter()
        .enumerate()
        .map(|(i, (title, score))| {
            Bar::new((n - 1 - i) as f64, *score)
                .width(0.7)
                .fill(palette[i])
                .name(title)
        })
        .collect();

    let labels: Vec<String> = snapshot
        .top_movies
        .iter()
        .rev()
        .map(|(title, _)| title.clone())
        .collect();

    Plot::new("top_rated")
        .height(CHART_HEIGHT)
        .x_axis_label("Rating")
        .allow_scroll(false)
        .allow_drag(false)
        .include_x(0.0)
        .include_x(RATING_SCALE.1 + 1.0)
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
                return String::new();
            }
            labels.get(pos as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
            for (i, (_, score)) in snapshot.top_movies.iter().enumerate() {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(*score, (n - 1 - i) as f64),
                        RichText::new(format!(" {score:.1}")).size(12.0),
                    )
                    .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Budget vs gross
// ---------------------------------------------------------------------------

pub fn budget_vs_gross(ui: &mut Ui, table: &MovieTable, visible: &[usize]) {
    ui.heading("Budget vs gross");
    if !has_rows(ui, visible.len()) {
        return;
    }

    let scores = visible.iter().map(|&i| table.records[i].score);
    let min = scores.clone().fold(f64::INFINITY, f64::min);
    let max = scores.fold(f64::NEG_INFINITY, f64::max);
    let scale = ColorScale::new(min, max);

    // One series per score bucket so the legend reads as a colour key.
    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); SCATTER_BUCKETS];
    for &i in visible {
        let m = &table.records[i];
        let b = ((scale.normalize(m.score) * SCATTER_BUCKETS as f64) as usize)
            .min(SCATTER_BUCKETS - 1);
        buckets[b].push([m.budget, m.gross]);
    }

    Plot::new("budget_vs_gross")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Budget (million USD)")
        .y_axis_label("Gross (million USD)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (b, points) in buckets.into_iter().enumerate() {
                if points.is_empty() {
                    continue;
                }
                let lo = min + (max - min) * b as f64 / SCATTER_BUCKETS as f64;
                let hi = min + (max - min) * (b + 1) as f64 / SCATTER_BUCKETS as f64;
                let t = (b as f64 + 0.5) / SCATTER_BUCKETS as f64;
                let color = scale.color_for(min + (max - min) * t);
                plot_ui.points(
                    Points::new(points)
                        .name(format!("Rating {lo:.1}–{hi:.1}"))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(2.0 + 5.0 * t as f32)
                        .color(color.gamma_multiply(0.7)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Budget trend
// ---------------------------------------------------------------------------

pub fn budget_trend(ui: &mut Ui, snapshot: &Snapshot) {
    ui.heading("Average budget by year");
    if !has_rows(ui, snapshot.budget_trend.len()) {
        return;
    }

    let points: Vec<[f64; 2]> = snapshot
        .budget_trend
        .iter()
        .map(|&(year, budget)| [year as f64, budget])
        .collect();

    Plot::new("budget_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Average budget")
        .allow_scroll(false)
        .include_y(0.0)
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .y_axis_formatter(|mark, _range| format::money_tick(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points.clone())
                    .name("Average budget")
                    .color(TREND_COLOR)
                    .width(2.5),
            );
            plot_ui.points(
                Points::new(points)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(4.0)
                    .color(TREND_COLOR),
            );
        });
}
