use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::filter::round2;
use crate::state::{AppState, SortColumn};

// ---------------------------------------------------------------------------
// Result table (bottom panel)
// ---------------------------------------------------------------------------

/// Render the sortable result grid. Index values show rounded to 2 decimals;
/// the raw values stay in the table for the chart.
pub fn results_table(ui: &mut Ui, state: &mut AppState) {
    let rows: Vec<(i32, String, String, f64)> = {
        let Some(table) = &state.table else {
            return;
        };
        state
            .sorted_results()
            .into_iter()
            .map(|idx| {
                let rec = &table.records[idx];
                (
                    rec.year,
                    rec.stock_code.clone(),
                    rec.company_name.clone(),
                    rec.index_value,
                )
            })
            .collect()
    };

    if rows.is_empty() {
        ui.label(if state.has_run {
            "No matching records."
        } else {
            "Results appear here after a query."
        });
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder().at_least(140.0))
        .column(Column::auto().at_least(90.0))
        .header(20.0, |mut header| {
            header.col(|ui| sort_header(ui, state, SortColumn::Year, "Year"));
            header.col(|ui| sort_header(ui, state, SortColumn::Code, "Code"));
            header.col(|ui| sort_header(ui, state, SortColumn::Company, "Company"));
            header.col(|ui| sort_header(ui, state, SortColumn::Index, "Index"));
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let (year, code, company, value) = &rows[row.index()];
                row.col(|ui| {
                    ui.label(year.to_string());
                });
                row.col(|ui| {
                    ui.label(code);
                });
                row.col(|ui| {
                    ui.label(company);
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", round2(*value)));
                });
            });
        });
}

/// Clickable column header carrying the sort arrow.
fn sort_header(ui: &mut Ui, state: &mut AppState, column: SortColumn, label: &str) {
    let active = state.sort.column == column;
    let text = if active {
        let arrow = if state.sort.ascending { "↑" } else { "↓" };
        format!("{label} {arrow}")
    } else {
        label.to_string()
    };
    if ui.selectable_label(active, text).clicked() {
        state.sort.toggle(column);
    }
}
