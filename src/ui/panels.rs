use chrono::{DateTime, Datelike, Local};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::SummaryMetrics;
use crate::data::filter::RATING_SCALE;
use crate::data::loader::DataSource;
use crate::format;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let table = match &state.table {
        Some(t) => t.clone(),
        None => {
            if state.loading {
                ui.horizontal(|ui: &mut Ui| {
                    ui.spinner();
                    ui.label("Loading dataset…");
                });
            } else {
                ui.label("No dataset loaded.");
            }
            return;
        }
    };

    // Widgets edit a copy; the state refilters once if anything changed.
    let mut params = state.filters.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            ui.strong("Year range");
            if let Some((lo, hi)) = table.year_bounds() {
                ui.add(egui::Slider::new(&mut params.years.0, lo..=hi).text("from"));
                ui.add(egui::Slider::new(&mut params.years.1, lo..=hi).text("to"));
            }
            ui.separator();

            // ---- Rating range ----
            ui.strong("Rating range");
            let scale = RATING_SCALE.0..=RATING_SCALE.1;
            ui.add(
                egui::Slider::new(&mut params.rating.0, scale.clone())
                    .step_by(0.1)
                    .text("min"),
            );
            ui.add(
                egui::Slider::new(&mut params.rating.1, scale)
                    .step_by(0.1)
                    .text("max"),
            );
            if let Some((lo, hi)) = table.score_bounds() {
                ui.label(RichText::new(format!("Scores in data: {lo:.1}–{hi:.1}")).weak());
            }
            ui.separator();

            // ---- Genre multi-select ----
            let header_text = format!(
                "Genres  ({}/{})",
                params.genres.len(),
                table.genre_vocabulary.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("genres")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            params.genres = table.genre_vocabulary.clone();
                        }
                        if ui.small_button("None").clicked() {
                            params.genres.clear();
                        }
                    });

                    for genre in &table.genre_vocabulary {
                        let mut checked = params.genres.contains(genre);
                        if ui.checkbox(&mut checked, genre.as_str()).changed() {
                            if checked {
                                params.genres.insert(genre.clone());
                            } else {
                                params.genres.remove(genre);
                            }
                        }
                    }
                });

            if params.genres.is_empty() {
                ui.label(RichText::new("No genre selected: nothing will match.").weak());
            }
        });

    state.update_filters(params);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open local file…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload from source").clicked() {
                let source = state.source.clone();
                state.start_load(source, true);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} movies loaded, {} visible",
                format::thousands(table.len()),
                format::thousands(state.visible_indices.len())
            ));
            ui.separator();
        }

        if state.loading {
            ui.spinner();
            ui.label(format!("Loading {}", state.source));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.start_load(DataSource::File(path), true);
    }
}

// ---------------------------------------------------------------------------
// Metrics row
// ---------------------------------------------------------------------------

/// Four headline numbers across the top of the dashboard.
pub fn overview(ui: &mut Ui, metrics: &SummaryMetrics) {
    ui.heading("Overview");
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Movies", format::thousands(metrics.count));
        metric(&mut cols[1], "Average budget", format::opt_millions(metrics.mean_budget));
        metric(&mut cols[2], "Average gross", format::opt_millions(metrics.mean_gross));
        metric(&mut cols[3], "Average rating", format::opt_rating(metrics.mean_score));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui, loaded_at: Option<DateTime<Local>>) {
    ui.label(
        RichText::new(
            "Rows with any missing value are dropped · money is in millions USD · \
             ROI = profit / budget × 100%",
        )
        .small(),
    );
    let refreshed = loaded_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format::NOT_AVAILABLE.to_string());
    ui.label(
        RichText::new(format!(
            "© {} Cinescope · last refreshed {refreshed}",
            Local::now().year()
        ))
        .small()
        .weak(),
    );
}
