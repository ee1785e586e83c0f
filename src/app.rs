use std::time::Duration;

use eframe::egui::{self, ScrollArea, Ui};

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CinescopeApp {
    pub state: AppState,
}

impl CinescopeApp {
    /// Create the app and start loading the configured source.
    pub fn new(config: Config) -> Self {
        let mut state = AppState::new(config);
        let source = state.source.clone();
        state.start_load(source, false);
        Self { state }
    }
}

impl eframe::App for CinescopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();
        if self.state.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: notes ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui, self.state.loaded_at);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(movies) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loading {
                ui.heading("Loading movie data…");
            } else {
                ui.heading("No data loaded  (File → Open local file… or Reload from source)");
            }
        });
        return;
    };

    let snapshot = &state.snapshot;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(metrics) = &snapshot.metrics {
                panels::overview(ui, metrics);
            }
            ui.separator();
            plot::score_distribution(ui, snapshot);
            ui.separator();
            plot::top_rated(ui, snapshot);
            ui.separator();
            plot::budget_vs_gross(ui, movies, &state.visible_indices);
            ui.separator();
            plot::budget_trend(ui, snapshot);
            ui.separator();
            table::raw_data(ui, movies, &state.visible_indices);
        });
}
