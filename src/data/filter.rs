use std::cmp::Ordering;

use serde::Deserialize;

use super::geo::{distance_km, GeoPoint};
use super::model::{normalize_text, FacilityRecord, Tier};
use super::tier::classify_tier;

// ---------------------------------------------------------------------------
// Filter state: the user's current criteria
// ---------------------------------------------------------------------------

/// Active comparator for the result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Alphabetical; also the tie-break for every other mode.
    #[default]
    Name,
    /// Most beds first, unknown counted as zero.
    BedDesc,
    /// Closest to the reference point first.
    Nearest,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::BedDesc, SortKey::Nearest];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Name (A–Z)",
            SortKey::BedDesc => "Beds (most first)",
            SortKey::Nearest => "Nearest",
        }
    }
}

/// How the service filter compares against a record's capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Case-insensitive containment on word boundaries: `maternity` finds
    /// "Maternity Ward", `er` finds "ER" but not "General".
    #[default]
    Contains,
    /// Case-insensitive whole value.
    Exact,
}

/// Flat filter criteria. Empty strings, `None` and `false` mean "no
/// constraint" for their field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search: String,
    pub province: String,
    pub ownership: String,
    pub facility_type: String,
    pub category: String,
    pub rural_urban: String,
    pub tier: Option<Tier>,
    pub service: String,
    pub open24: bool,
    pub sort: SortKey,
    /// Reference point for distances and nearest-first sorting.
    pub location: Option<GeoPoint>,
    pub service_match: MatchPolicy,
}

impl FilterState {
    /// Whether any record-narrowing criterion is set (sort and location
    /// only reorder).
    pub fn is_narrowing(&self) -> bool {
        !self.search.trim().is_empty()
            || !self.province.is_empty()
            || !self.ownership.is_empty()
            || !self.facility_type.is_empty()
            || !self.category.is_empty()
            || !self.rural_urban.is_empty()
            || self.tier.is_some()
            || !self.service.trim().is_empty()
            || self.open24
    }

    /// Clear every narrowing criterion, keeping sort, location and policy.
    pub fn cleared(&self) -> FilterState {
        FilterState {
            sort: self.sort,
            location: self.location,
            service_match: self.service_match,
            ..FilterState::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Query: filter + enrich + sort
// ---------------------------------------------------------------------------

/// A record that passed the filters, with its derived fields.
#[derive(Debug, Clone)]
pub struct Enriched<'a> {
    /// Position in the input slice.
    pub index: usize,
    pub record: &'a FacilityRecord,
    pub tier: Tier,
    /// Unrounded kilometres from the reference point.
    pub distance_km: Option<f64>,
}

/// Filter and order `records` according to `filters`.
///
/// Pure: inputs are not mutated and an impossible combination of criteria
/// simply yields an empty list.
pub fn query<'a>(records: &'a [FacilityRecord], filters: &FilterState) -> Vec<Enriched<'a>> {
    let search = filters.search.trim().to_lowercase();
    let service = filters.service.trim().to_lowercase();

    let mut rows: Vec<(String, Enriched<'a>)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches_fields(r, filters))
        .filter(|(_, r)| search.is_empty() || search_text(r).contains(&search))
        .filter(|(_, r)| service.is_empty() || offers_service(r, &service, filters.service_match))
        .filter(|(_, r)| !filters.open24 || r.is_open_24h())
        .filter_map(|(index, record)| {
            let tier = classify_tier(record);
            if filters.tier.is_some_and(|wanted| wanted != tier) {
                return None;
            }
            let enriched = Enriched {
                index,
                record,
                tier,
                distance_km: distance_km(record, filters.location),
            };
            Some((record.name.to_lowercase(), enriched))
        })
        .collect();

    let sort = match filters.sort {
        SortKey::Nearest if filters.location.is_none() => SortKey::Name,
        other => other,
    };

    rows.sort_by(|(a_key, a), (b_key, b)| {
        let primary = match sort {
            SortKey::Name => Ordering::Equal,
            SortKey::BedDesc => b
                .record
                .bed_count
                .unwrap_or(0)
                .cmp(&a.record.bed_count.unwrap_or(0)),
            SortKey::Nearest => a
                .distance_km
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY)),
        };
        primary
            .then_with(|| a_key.cmp(b_key))
            .then_with(|| a.record.name.cmp(&b.record.name))
    });

    log::debug!(
        "query: {} of {} facilities match (sort {:?})",
        rows.len(),
        records.len(),
        sort
    );

    rows.into_iter().map(|(_, row)| row).collect()
}

/// Exact, case-sensitive equality on the selector columns.
fn matches_fields(record: &FacilityRecord, f: &FilterState) -> bool {
    field_equals(&f.province, record.province.as_deref())
        && field_equals(&f.ownership, record.ownership.as_deref())
        && field_equals(&f.facility_type, record.facility_kind())
        && field_equals(&f.category, record.category.as_deref())
        && field_equals(&f.rural_urban, record.rural_urban.as_deref())
}

fn field_equals(wanted: &str, actual: Option<&str>) -> bool {
    wanted.is_empty() || actual == Some(wanted)
}

/// Lowercased haystack for free-text search.
fn search_text(record: &FacilityRecord) -> String {
    let mut text = record.name.to_lowercase();
    for part in [&record.city, &record.district].into_iter().flatten() {
        text.push(' ');
        text.push_str(&part.to_lowercase());
    }
    for cap in record.offered_services() {
        text.push(' ');
        text.push_str(&cap.to_lowercase());
    }
    text
}

/// `needle` must already be trimmed and lowercased.
fn offers_service(record: &FacilityRecord, needle: &str, policy: MatchPolicy) -> bool {
    record.offered_services().iter().any(|cap| match policy {
        MatchPolicy::Contains => contains_words(cap, needle),
        MatchPolicy::Exact => cap.to_lowercase() == needle,
    })
}

/// Whether the words of `needle` occur consecutively among the words of
/// `haystack`. Needles without any word characters fall back to a plain
/// substring test.
fn contains_words(haystack: &str, needle: &str) -> bool {
    let phrase = normalize_text(needle);
    if phrase.is_empty() {
        return haystack.to_lowercase().contains(needle);
    }
    let hay = normalize_text(haystack);
    let wanted: Vec<&str> = phrase.split(' ').collect();
    let words: Vec<&str> = hay.split(' ').collect();
    words.windows(wanted.len()).any(|w| w == wanted.as_slice())
}
