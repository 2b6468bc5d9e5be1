//! Quick filters: one-click presets over the facility-type, service,
//! rural/urban and open-24h fields.

use super::filter::FilterState;

/// A named partial assignment of the governed filter fields. Fields left
/// `None` / `false` are reset to neutral when the preset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickFilter {
    pub label: &'static str,
    pub facility_type: Option<&'static str>,
    pub service: Option<&'static str>,
    pub rural_urban: Option<&'static str>,
    pub open24: bool,
}

impl QuickFilter {
    const NEUTRAL: QuickFilter = QuickFilter {
        label: "",
        facility_type: None,
        service: None,
        rural_urban: None,
        open24: false,
    };
}

pub const PRESETS: &[QuickFilter] = &[
    QuickFilter {
        label: "Hospitals",
        facility_type: Some("Hospital"),
        ..QuickFilter::NEUTRAL
    },
    QuickFilter {
        label: "Clinics",
        facility_type: Some("Clinic"),
        ..QuickFilter::NEUTRAL
    },
    QuickFilter {
        label: "Pharmacies",
        facility_type: Some("Pharmacy"),
        ..QuickFilter::NEUTRAL
    },
    QuickFilter {
        label: "Maternity",
        service: Some("maternity"),
        ..QuickFilter::NEUTRAL
    },
    QuickFilter {
        label: "Emergency",
        service: Some("ER"),
        ..QuickFilter::NEUTRAL
    },
    QuickFilter {
        label: "Rural",
        rural_urban: Some("Rural"),
        ..QuickFilter::NEUTRAL
    },
    QuickFilter {
        label: "24h",
        open24: true,
        ..QuickFilter::NEUTRAL
    },
];

/// Copy of `state` with the preset's governed fields written. Search,
/// province, ownership, category, tier, sort and location are untouched.
/// An unknown index returns the state unchanged.
pub fn apply_preset(state: &FilterState, index: usize) -> FilterState {
    let mut next = state.clone();
    if let Some(preset) = PRESETS.get(index) {
        next.facility_type = preset.facility_type.unwrap_or_default().to_string();
        next.service = preset.service.unwrap_or_default().to_string();
        next.rural_urban = preset.rural_urban.unwrap_or_default().to_string();
        next.open24 = preset.open24;
    }
    next
}

/// True iff the governed fields hold exactly what [`apply_preset`] writes.
pub fn matches_preset(state: &FilterState, index: usize) -> bool {
    let Some(preset) = PRESETS.get(index) else {
        return false;
    };
    state.facility_type == preset.facility_type.unwrap_or_default()
        && state.service == preset.service.unwrap_or_default()
        && state.rural_urban == preset.rural_urban.unwrap_or_default()
        && state.open24 == preset.open24
}

/// Index of the preset to highlight, if any.
pub fn active_preset(state: &FilterState) -> Option<usize> {
    (0..PRESETS.len()).find(|&i| matches_preset(state, i))
}
