use std::time::Instant;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use zimcare::data::filter::SortKey;
use zimcare::data::loader::{self, Origin};
use zimcare::data::model::{Column, FacilityDataset, Tier};
use zimcare::data::presets::{active_preset, PRESETS};
use zimcare::location;
use zimcare::state::{AppState, ViewMode};

use crate::app::Action;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) -> Vec<Action> {
    let mut actions = Vec::new();

    ui.heading("Find a facility");
    ui.separator();

    let before = state.filters.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Free-text search (debounced) ----
            let search = ui.add(
                egui::TextEdit::singleline(&mut state.search_input)
                    .hint_text("Name, town or service"),
            );
            if search.changed() {
                state.type_search(Instant::now());
            }
            ui.add_space(4.0);

            // ---- Quick filters ----
            ui.strong("Quick filters");
            let active = active_preset(&state.filters);
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for (i, preset) in PRESETS.iter().enumerate() {
                    if ui
                        .selectable_label(active == Some(i), preset.label)
                        .clicked()
                    {
                        state.apply_preset(i);
                    }
                }
            });
            ui.separator();

            // ---- Column selectors ----
            let empty = FacilityDataset::default();
            let dataset = state.dataset.as_ref().unwrap_or(&empty);
            let filters = &mut state.filters;

            column_combo(ui, "Province", "All provinces", &mut filters.province, dataset, Column::Province);
            column_combo(ui, "Ownership", "Any ownership", &mut filters.ownership, dataset, Column::Ownership);
            column_combo(ui, "Facility type", "All types", &mut filters.facility_type, dataset, Column::FacilityType);
            column_combo(ui, "Category", "All facilities", &mut filters.category, dataset, Column::Category);
            column_combo(ui, "Rural / urban", "Anywhere", &mut filters.rural_urban, dataset, Column::RuralUrban);
            column_combo(ui, "Service", "All services", &mut filters.service, dataset, Column::Service);

            ui.strong("Tier");
            let tier_text = filters
                .tier
                .map(|t| t.to_string())
                .unwrap_or_else(|| "All tiers".to_string());
            egui::ComboBox::from_id_salt("tier")
                .selected_text(tier_text)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut filters.tier, None, "All tiers");
                    for tier in Tier::ALL {
                        ui.selectable_value(&mut filters.tier, Some(tier), tier.to_string());
                    }
                });

            ui.checkbox(&mut filters.open24, "Open 24 hours");
            ui.separator();

            // ---- Sort ----
            ui.strong("Sort by");
            let current = state.filters.sort;
            egui::ComboBox::from_id_salt("sort")
                .selected_text(current.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for key in SortKey::ALL {
                        if ui.selectable_label(current == key, key.label()).clicked() {
                            state.set_sort(key);
                        }
                    }
                });
            ui.separator();

            // ---- Reference point ----
            location_section(ui, state, &mut actions);
            ui.separator();

            let anything_set = state.filters.is_narrowing() || !state.search_input.is_empty();
            if ui
                .add_enabled(anything_set, egui::Button::new("Clear filters"))
                .clicked()
            {
                state.clear_filters();
            }
        });

    if state.filters != before {
        state.mark_dirty();
    }
    actions
}

/// Selector over the unique values of one column; empty means "all".
fn column_combo(
    ui: &mut Ui,
    title: &str,
    all_label: &str,
    value: &mut String,
    dataset: &FacilityDataset,
    column: Column,
) {
    ui.strong(title);
    let selected = if value.is_empty() {
        all_label.to_string()
    } else {
        value.clone()
    };
    egui::ComboBox::from_id_salt(title)
        .selected_text(selected)
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(value, String::new(), all_label);
            for option in dataset.values(column) {
                ui.selectable_value(value, option.to_string(), option);
            }
        });
}

fn location_section(ui: &mut Ui, state: &mut AppState, actions: &mut Vec<Action>) {
    ui.strong("Your location");
    match state.filters.location {
        Some(point) => {
            ui.label(format!("{:.4}, {:.4}", point.lat, point.lon));
            if ui.small_button("Clear location").clicked() {
                state.clear_location();
            }
        }
        None => {
            ui.label(RichText::new("Not set – distances unavailable").weak());
        }
    }

    ui.add_enabled_ui(!state.locating, |ui: &mut Ui| {
        if ui.button("Use my location").clicked() {
            actions.push(Action::Locate);
        }
    });
    if state.locating {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Locating…");
        });
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.manual_lat)
                .hint_text("lat")
                .desired_width(70.0),
        );
        ui.add(
            egui::TextEdit::singleline(&mut state.manual_lon)
                .hint_text("lon")
                .desired_width(70.0),
        );
        if ui.small_button("Set").clicked() {
            match location::parse_manual(&state.manual_lat, &state.manual_lon) {
                Ok(point) => state.set_location(point),
                Err(e) => state.location_failed(&e),
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) -> Vec<Action> {
    let mut actions = Vec::new();

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload sources").clicked() {
                actions.push(Action::Reload);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.view, ViewMode::Cards, "Cards");
        ui.selectable_value(&mut state.view, ViewMode::Map, "Map");

        ui.separator();

        if state.loading {
            ui.spinner();
            ui.label("Loading facilities…");
        } else if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} facilities loaded, {} shown",
                ds.len(),
                state.results.len()
            ));
        }

        if let Some(notice) = &state.notice {
            ui.separator();
            ui.label(RichText::new(notice).color(Color32::from_rgb(230, 160, 40)));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    actions
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open facility data")
        .add_filter("Supported files", &["json", "csv"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} facilities from {}",
                    dataset.len(),
                    path.display()
                );
                state.set_dataset(dataset, Origin::File(path));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
