use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::MovieTable;
use crate::format;

const ROW_HEIGHT: f32 = 18.0;
const FIXED_COLUMNS: [&str; 8] = [
    "Title", "Year", "Genre", "Rating", "Budget", "Gross", "Profit", "ROI",
];

/// Collapsible table of the filtered rows, with money and ROI formatting.
pub fn raw_data(ui: &mut Ui, table: &MovieTable, visible: &[usize]) {
    egui::CollapsingHeader::new(RichText::new("Filtered data").strong())
        .id_salt("raw_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let n_extra = table.extra_columns.len();

            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(160.0).clip(true))
                .columns(Column::auto(), FIXED_COLUMNS.len() - 1 + n_extra)
                .min_scrolled_height(0.0)
                .max_scroll_height(400.0)
                .header(20.0, |mut header| {
                    for name in FIXED_COLUMNS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                    for name in &table.extra_columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, visible.len(), |mut row| {
                        let m = &table.records[visible[row.index()]];
                        let cells = [
                            m.title.clone(),
                            m.year.to_string(),
                            m.genre.clone(),
                            format!("{:.1}", m.score),
                            format::millions(m.budget),
                            format::millions(m.gross),
                            format::millions(m.profit),
                            format::opt_percent(m.roi),
                        ];
                        for text in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(text);
                            });
                        }
                        for name in &table.extra_columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(m.extra.get(name).map(String::as_str).unwrap_or(""));
                            });
                        }
                    });
                });
        });
}
