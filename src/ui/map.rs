use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};
use zimcare::state::AppState;

// ---------------------------------------------------------------------------
// Facility map (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered facilities as markers, one colour per province.
pub fn facility_map(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Loading facilities…");
            });
            return;
        }
    };

    let mut by_province: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    let mut unplaced = 0usize;
    for row in &state.results {
        let record = &dataset.records[row.index];
        match record.coordinates() {
            Some(p) => by_province
                .entry(record.province.as_deref().unwrap_or("Unknown province"))
                .or_default()
                .push([p.lon, p.lat]),
            None => unplaced += 1,
        }
    }

    if unplaced > 0 {
        ui.label(format!("{unplaced} matching facilities have no coordinates"));
    }

    Plot::new("facility_map")
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (province, coords) in by_province {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(Some(province)))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let markers = Points::new(PlotPoints::from(coords))
                    .name(province)
                    .color(color)
                    .shape(MarkerShape::Circle)
                    .radius(4.0);
                plot_ui.points(markers);
            }

            if let Some(here) = state.filters.location {
                let marker = Points::new(PlotPoints::from(vec![[here.lon, here.lat]]))
                    .name("Your location")
                    .color(Color32::WHITE)
                    .shape(MarkerShape::Diamond)
                    .radius(6.0);
                plot_ui.points(marker);
            }
        });
}
