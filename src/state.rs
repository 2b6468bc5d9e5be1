use std::time::{Duration, Instant};

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::filter::{query, FilterState, SortKey};
use crate::data::geo::GeoPoint;
use crate::data::loader::{LoadOutcome, Origin};
use crate::data::model::{Column, FacilityDataset, Tier};
use crate::data::presets::apply_preset;
use crate::error::LocationError;

// ---------------------------------------------------------------------------
// Search debounce
// ---------------------------------------------------------------------------

/// Holds typed search text until it has been stable for `delay`.
#[derive(Debug, Clone)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a keystroke; restarts the delay.
    pub fn push(&mut self, text: String, now: Instant) {
        self.pending = Some((text, now));
    }

    /// Take the pending text once its delay has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if due {
            self.pending.take().map(|(text, _)| text)
        } else {
            None
        }
    }

    /// Time left until the pending text is due, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, at)| self.delay.saturating_sub(now.saturating_duration_since(*at)))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Presentation view of the results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Cards,
    Map,
}

/// One visible row: index into the dataset plus derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub index: usize,
    pub tier: Tier,
    pub distance_km: Option<f64>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None until the first load completes).
    pub dataset: Option<FacilityDataset>,
    pub origin: Option<Origin>,

    pub filters: FilterState,

    /// Rows passing the current filters, in display order (cached).
    pub results: Vec<ResultRow>,

    /// Search box contents; reaches `filters.search` through the debounce.
    pub search_input: String,
    pub debounce: SearchDebounce,

    pub view: ViewMode,

    /// Marker colours per province.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Non-fatal data notice (degraded load).
    pub notice: Option<String>,

    /// Whether a dataset load is in flight.
    pub loading: bool,
    /// Whether a location lookup is in flight.
    pub locating: bool,

    /// Manual coordinate entry fields.
    pub manual_lat: String,
    pub manual_lon: String,

    load_generation: u64,
    dirty: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let filters = FilterState {
            service_match: config.service_match,
            ..FilterState::default()
        };
        Self {
            debounce: SearchDebounce::new(config.search_debounce()),
            config,
            dataset: None,
            origin: None,
            filters,
            results: Vec::new(),
            search_input: String::new(),
            view: ViewMode::default(),
            color_map: None,
            status_message: None,
            notice: None,
            loading: false,
            locating: false,
            manual_lat: String::new(),
            manual_lon: String::new(),
            load_generation: 0,
            dirty: false,
        }
    }

    // -- Loading --

    /// Start a new load; results of earlier loads become stale.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.loading = true;
        self.load_generation
    }

    /// Apply a finished load unless a newer one has started or completed
    /// since. Returns whether it was applied.
    pub fn finish_load(&mut self, generation: u64, outcome: LoadOutcome) -> bool {
        if generation != self.load_generation {
            log::debug!(
                "Discarding superseded load {generation} (current {})",
                self.load_generation
            );
            return false;
        }
        self.notice = outcome
            .unavailable
            .as_ref()
            .map(|e| format!("Using cached data: {e}"));
        self.install(outcome.dataset, outcome.origin);
        true
    }

    /// Ingest a dataset obtained outside the source chain (File → Open…).
    /// Any in-flight load is superseded.
    pub fn set_dataset(&mut self, dataset: FacilityDataset, origin: Origin) {
        self.load_generation += 1;
        self.notice = None;
        self.install(dataset, origin);
    }

    fn install(&mut self, dataset: FacilityDataset, origin: Origin) {
        self.color_map = Some(ColorMap::new(dataset.values(Column::Province)));
        self.dataset = Some(dataset);
        self.origin = Some(origin);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    // -- Filtering --

    /// Request a re-query; coalesced into one per frame.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Re-query if anything changed since the last frame.
    pub fn refresh_if_dirty(&mut self) -> bool {
        if self.dirty {
            self.refilter();
            true
        } else {
            false
        }
    }

    /// Recompute `results` after a filter change.
    pub fn refilter(&mut self) {
        self.dirty = false;
        self.results = match &self.dataset {
            Some(ds) => query(&ds.records, &self.filters)
                .into_iter()
                .map(|row| ResultRow {
                    index: row.index,
                    tier: row.tier,
                    distance_km: row.distance_km,
                })
                .collect(),
            None => Vec::new(),
        };
    }

    /// Search box edited.
    pub fn type_search(&mut self, now: Instant) {
        self.debounce.push(self.search_input.clone(), now);
    }

    /// Apply debounced search text if due. Returns whether it was applied.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.debounce.take_due(now) {
            Some(text) => {
                if text != self.filters.search {
                    self.filters.search = text;
                    self.mark_dirty();
                }
                true
            }
            None => false,
        }
    }

    pub fn apply_preset(&mut self, index: usize) {
        self.filters = apply_preset(&self.filters, index);
        self.mark_dirty();
    }

    /// Reset every narrowing filter and the search box.
    pub fn clear_filters(&mut self) {
        self.filters = self.filters.cleared();
        self.search_input.clear();
        self.debounce = SearchDebounce::new(self.config.search_debounce());
        self.mark_dirty();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if sort == SortKey::Nearest && self.filters.location.is_none() {
            self.status_message =
                Some("Set your location to sort by distance; showing A–Z.".to_string());
        }
        self.filters.sort = sort;
        self.mark_dirty();
    }

    // -- Location --

    pub fn set_location(&mut self, point: GeoPoint) {
        log::info!("Reference point set to {:.4}, {:.4}", point.lat, point.lon);
        self.filters.location = Some(point);
        self.locating = false;
        self.status_message = None;
        self.mark_dirty();
    }

    /// Location unavailable: drop distance ordering back to names.
    pub fn location_failed(&mut self, err: &LocationError) {
        log::warn!("{err}");
        self.locating = false;
        if self.filters.sort == SortKey::Nearest && self.filters.location.is_none() {
            self.filters.sort = SortKey::Name;
            self.mark_dirty();
        }
        self.status_message = Some(format!("Location unavailable ({err}); sorting by name."));
    }

    pub fn clear_location(&mut self) {
        self.filters.location = None;
        if self.filters.sort == SortKey::Nearest {
            self.filters.sort = SortKey::Name;
        }
        self.mark_dirty();
    }
}
