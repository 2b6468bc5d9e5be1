use eframe::egui::{self, RichText, ScrollArea, Ui};
use zimcare::color::tier_color;
use zimcare::data::geo::format_distance;
use zimcare::data::model::FacilityRecord;
use zimcare::state::{AppState, ResultRow};

// ---------------------------------------------------------------------------
// Result cards (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered facilities as a scrolling list of cards.
pub fn result_cards(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Loading facilities…");
            });
            return;
        }
    };

    if state.results.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No facilities match your filters yet.");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for row in &state.results {
                card(ui, &dataset.records[row.index], row);
                ui.add_space(6.0);
            }
        });
}

fn card(ui: &mut Ui, record: &FacilityRecord, row: &ResultRow) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui: &mut Ui| {
            ui.label(
                RichText::new(row.tier.short())
                    .strong()
                    .color(tier_color(row.tier)),
            );
            ui.label(RichText::new(&record.name).heading());
            if let Some(km) = row.distance_km {
                ui.label(RichText::new(format_distance(km)).weak());
            }
            if record.verified == Some(true) {
                ui.label(RichText::new("✔ verified").small());
            }
        });

        let place = [record.locality(), record.province.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        let kind = record
            .facility_kind()
            .or(record.category.as_deref())
            .unwrap_or("Health Facility");
        ui.label(format!("{place} • {kind} • {}", row.tier));

        ui.label(record.address.as_deref().unwrap_or("Address coming soon"));

        let services = record.capabilities();
        if services.is_empty() {
            ui.label("Services: TBD");
        } else {
            ui.label(format!("Services: {}", services.join(", ")));
        }
        if !record.typical_services.is_empty() {
            ui.label(
                RichText::new(format!("Usually offers: {}", record.typical_services.join(", "))).weak(),
            );
        }

        ui.label(format!("Phone: {}", record.phone.as_deref().unwrap_or("N/A")));
        ui.label(format!(
            "Hours: {}",
            record
                .operating_hours
                .as_deref()
                .unwrap_or("See facility for details")
        ));

        egui::CollapsingHeader::new("More details")
            .id_salt(("details", row.index))
            .default_open(false)
            .show(ui, |ui: &mut Ui| details(ui, record));
    });
}

fn details(ui: &mut Ui, record: &FacilityRecord) {
    ui.label(format!(
        "Type: {} ({})",
        record.facility_kind().unwrap_or("Unknown"),
        record.ownership.as_deref().unwrap_or("ownership TBD")
    ));
    if let Some(setting) = &record.rural_urban {
        ui.label(format!("Setting: {setting}"));
    }
    ui.label(match record.bed_count {
        Some(beds) => format!("Beds: {beds}"),
        None => "Beds: Unknown".to_string(),
    });
    if record.is_open_24h() {
        ui.label("Open 24 hours");
    }
    if let Some(whatsapp) = &record.whatsapp {
        ui.label(format!("WhatsApp: {whatsapp}"));
    }
    if let Some(email) = &record.email {
        ui.label(format!("Email: {email}"));
    }
    if let Some(manager) = &record.manager {
        ui.label(format!("Manager: {manager}"));
    }
    let payments = record.payments();
    if !payments.is_empty() {
        ui.label(format!("Payments: {}", payments.join(", ")));
    }
    if let Some(website) = &record.website {
        ui.hyperlink_to(website.as_str(), website);
    }
    ui.label(format!(
        "Last verified: {}",
        record.last_verified.as_deref().unwrap_or("TBD")
    ));
}
