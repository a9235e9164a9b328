use std::collections::BTreeMap;

use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::data::filter::OffsetSign;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Index trend plot (central panel)
// ---------------------------------------------------------------------------

/// Render the index chart: one series per company over the queried years,
/// plus optional callout labels on the target year.
pub fn index_plot(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data file to get started  (File → Open…)");
        });
        return;
    };

    if state.results.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.has_run {
                ui.heading("No data to plot");
            } else {
                ui.heading("Set the query on the left and press Run");
            }
        });
        return;
    }

    // Group result rows per company. Results are sorted by year, so each
    // series comes out in plotting order.
    let mut series: BTreeMap<&str, (String, Vec<[f64; 2]>)> = BTreeMap::new();
    for &idx in &state.results {
        let rec = &table.records[idx];
        let entry = series
            .entry(rec.company_name.as_str())
            .or_insert_with(|| (rec.stock_code.clone(), Vec::new()));
        entry.1.push([rec.year as f64, rec.index_value]);
    }

    let single_year = series.values().all(|(_, pts)| pts.len() == 1);

    Plot::new("index_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Transformation index")
        .x_axis_formatter(|mark, _range| {
            let v = mark.value;
            if (v - v.round()).abs() < 1e-6 {
                format!("{v:.0}")
            } else {
                String::new()
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (company, (code, points)) in &series {
                let color = state.color_map.color_for(company);
                let name = format!("{company} ({code})");

                if !single_year {
                    let line_points: PlotPoints = points.iter().copied().collect();
                    plot_ui.line(Line::new(line_points).name(&name).color(color).width(1.5));
                }

                let marker_points: PlotPoints = points.iter().copied().collect();
                plot_ui.points(
                    Points::new(marker_points)
                        .name(&name)
                        .color(color)
                        .filled(true)
                        .radius(3.0),
                );
            }

            for callout in &state.callouts {
                // Keep labels clear of the point; negative values hang below.
                let (anchor, nudge) = match callout.offset {
                    OffsetSign::Up => (Align2::CENTER_BOTTOM, 0.15),
                    OffsetSign::Down => (Align2::CENTER_TOP, -0.15),
                };
                let pos = PlotPoint::new(callout.year as f64, callout.value + nudge);
                plot_ui.text(
                    Text::new(pos, RichText::new(callout.label.clone()).size(12.0))
                        .anchor(anchor),
                );
            }
        });
}
