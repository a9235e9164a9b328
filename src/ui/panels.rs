use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::MatchMode;
use crate::state::{AppState, StatusKind, StatusMessage, YearMode};

// ---------------------------------------------------------------------------
// Left side panel – query form
// ---------------------------------------------------------------------------

/// Render the left query panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Query");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        ui.label("Use File → Open… to load a CSV, JSON or Parquet file.");
        return;
    };

    // Clone what we need so we can mutate state inside the widgets.
    let years = table.years.clone();
    let (year_lo, year_hi) = table.year_range().unwrap_or((0, 0));
    let n_companies = table.company_names.len();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Identifiers ----
            ui.strong("Stock codes / company names");
            ui.add(
                egui::TextEdit::singleline(&mut state.identifier_input)
                    .hint_text("e.g. 600000,600016"),
            );
            ui.small("Separate multiple entries with commas");

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Match by:");
                ui.radio_value(&mut state.match_mode, MatchMode::ByCode, "Code");
                ui.radio_value(&mut state.match_mode, MatchMode::ByName, "Name");
            });
            ui.separator();

            // ---- Year selection ----
            ui.strong("Years");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.year_mode, YearMode::Single, "Single year");
                ui.radio_value(&mut state.year_mode, YearMode::Trend, "Trend");
            });

            match state.year_mode {
                YearMode::Single => {
                    let current = state
                        .single_year
                        .map(|y| y.to_string())
                        .unwrap_or_default();
                    egui::ComboBox::from_id_salt("single_year")
                        .selected_text(current)
                        .show_ui(ui, |ui: &mut Ui| {
                            for &year in &years {
                                if ui
                                    .selectable_label(
                                        state.single_year == Some(year),
                                        year.to_string(),
                                    )
                                    .clicked()
                                {
                                    state.single_year = Some(year);
                                }
                            }
                        });
                }
                YearMode::Trend => {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_years();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_years();
                        }
                    });
                    for &year in &years {
                        let mut checked = state.trend_years.contains(&year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            if checked {
                                state.trend_years.insert(year);
                            } else {
                                state.trend_years.remove(&year);
                            }
                        }
                    }
                }
            }
            ui.separator();

            ui.checkbox(&mut state.show_callouts, "Annotate target year");
            ui.separator();

            // ---- Actions ----
            ui.horizontal(|ui: &mut Ui| {
                if ui.button(RichText::new("Run query").strong()).clicked() {
                    state.run_query();
                }
                if ui.button("Reset").clicked() {
                    state.reset_query();
                }
            });
            ui.separator();

            // ---- Dataset summary ----
            ui.strong("Dataset");
            ui.small(format!("Years {year_lo} – {year_hi}"));
            ui.small(format!("{n_companies} companies"));
            ui.small("Single year shows points for one year; trend plots the selection");
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(
                    !state.results.is_empty(),
                    egui::Button::new("Export results…"),
                )
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} matched",
                table.len(),
                state.results.len()
            ));
        }

        ui.separator();

        if let Some(status) = &state.status {
            let color = match status.kind {
                StatusKind::Info => Color32::LIGHT_GREEN,
                StatusKind::Warning => Color32::YELLOW,
                StatusKind::Error => Color32::RED,
            };
            ui.label(RichText::new(&status.text).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open index data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export query results")
        .add_filter("CSV", &["csv"])
        .set_file_name("query_results.csv")
        .save_file();

    if let Some(path) = file {
        match state.export_results(&path) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", state.results.len(), path.display());
                state.status = Some(StatusMessage::info(format!(
                    "Exported to {}",
                    path.display()
                )));
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                state.status = Some(StatusMessage::error(format!("Export failed: {e}")));
            }
        }
    }
}
