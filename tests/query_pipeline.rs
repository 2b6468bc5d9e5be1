// tests/query_pipeline.rs
//
// End-to-end properties of tiering, filtering and ordering over the
// public API, using the compiled-in snapshot plus small hand-built sets.
//
use std::collections::BTreeSet;

use zimcare::data::filter::{query, Enriched, FilterState, SortKey};
use zimcare::data::geo::GeoPoint;
use zimcare::data::loader::embedded_snapshot;
use zimcare::data::model::{FacilityRecord, Tier};
use zimcare::data::presets::{apply_preset, matches_preset, PRESETS};
use zimcare::data::tier::classify_tier;

fn facility(name: &str) -> FacilityRecord {
    FacilityRecord {
        name: name.into(),
        ..Default::default()
    }
}

fn names(rows: &[Enriched<'_>]) -> Vec<String> {
    rows.iter().map(|r| r.record.name.clone()).collect()
}

fn ids(rows: &[Enriched<'_>]) -> BTreeSet<usize> {
    rows.iter().map(|r| r.index).collect()
}

#[test]
fn name_order_example() {
    let records = vec![
        facility("Zvishavane District Hospital"),
        facility("Avondale Pharmacy"),
    ];
    let rows = query(&records, &FilterState::default());
    assert_eq!(
        names(&rows),
        vec!["Avondale Pharmacy", "Zvishavane District Hospital"]
    );
}

#[test]
fn nearest_without_reference_is_name_order() {
    let ds = embedded_snapshot();
    let by_name = query(&ds.records, &FilterState::default());
    let nearest = query(
        &ds.records,
        &FilterState {
            sort: SortKey::Nearest,
            ..Default::default()
        },
    );
    assert_eq!(names(&by_name), names(&nearest));
    assert!(nearest.iter().all(|r| r.distance_km.is_none()));
}

#[test]
fn nearest_puts_unplaced_last() {
    let harare = GeoPoint::new(-17.8298, 31.0530);
    let records = vec![
        FacilityRecord {
            latitude: Some(-20.1604),
            longitude: Some(28.5887),
            ..facility("Bulawayo")
        },
        facility("Nowhere A"),
        FacilityRecord {
            latitude: Some(-17.83),
            longitude: Some(31.05),
            ..facility("Harare")
        },
        facility("Nowhere B"),
    ];
    let rows = query(
        &records,
        &FilterState {
            sort: SortKey::Nearest,
            location: harare,
            ..Default::default()
        },
    );
    assert_eq!(names(&rows), vec!["Harare", "Bulawayo", "Nowhere A", "Nowhere B"]);
    assert!(rows[0].distance_km.unwrap() < rows[1].distance_km.unwrap());
}

#[test]
fn independent_predicates_compose() {
    let ds = embedded_snapshot();
    let province = FilterState {
        province: "Harare".into(),
        ..Default::default()
    };
    let tier = FilterState {
        tier: Some(Tier::T1),
        ..Default::default()
    };
    let both = FilterState {
        province: "Harare".into(),
        tier: Some(Tier::T1),
        ..Default::default()
    };

    let by_province = ids(&query(&ds.records, &province));
    let by_tier = ids(&query(&ds.records, &tier));
    let combined = ids(&query(&ds.records, &both));

    let intersection: BTreeSet<usize> = by_province.intersection(&by_tier).copied().collect();
    assert_eq!(combined, intersection);
    assert!(!combined.is_empty());
}

#[test]
fn query_does_not_touch_inputs() {
    let ds = embedded_snapshot();
    let records = ds.records.clone();
    let filters = FilterState {
        search: "hospital".into(),
        sort: SortKey::BedDesc,
        ..Default::default()
    };
    let snapshot = filters.clone();
    let _ = query(&records, &filters);
    assert_eq!(records, ds.records);
    assert_eq!(filters, snapshot);
}

#[test]
fn impossible_combination_is_empty() {
    let ds = embedded_snapshot();
    let filters = FilterState {
        province: "Harare".into(),
        category: "no-such-category".into(),
        ..Default::default()
    };
    assert!(query(&ds.records, &filters).is_empty());
}

#[test]
fn search_covers_services() {
    let records = vec![
        FacilityRecord {
            specialists: vec!["Radiology".into()],
            ..facility("Baines Imaging Group")
        },
        FacilityRecord {
            city: Some("Gweru".into()),
            ..facility("Other")
        },
    ];
    let find = |text: &str| {
        names(&query(
            &records,
            &FilterState {
                search: text.into(),
                ..Default::default()
            },
        ))
    };
    assert_eq!(find("RADIO"), vec!["Baines Imaging Group"]);
    assert_eq!(find("gweru"), vec!["Other"]);
    assert_eq!(find("  "), vec!["Baines Imaging Group", "Other"]);
}

#[test]
fn snapshot_explicit_tiers_are_respected() {
    let ds = embedded_snapshot();
    for record in &ds.records {
        if let Some(explicit) = record.tier.as_deref().and_then(Tier::parse) {
            assert_eq!(classify_tier(record), explicit, "{}", record.name);
        }
    }
}

#[test]
fn bed_count_example() {
    let r = FacilityRecord {
        bed_count: Some(400),
        kind: Some("private".into()),
        specialists: vec![],
        ..facility("Private 400")
    };
    assert_eq!(classify_tier(&r), Tier::T1);
}

fn has_word(text: &str, word: &str) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word.to_lowercase())
}

#[test]
fn every_preset_selects_what_it_names() {
    let ds = embedded_snapshot();
    for (i, preset) in PRESETS.iter().enumerate() {
        let state = apply_preset(&FilterState::default(), i);
        assert!(matches_preset(&state, i), "{}", preset.label);

        let rows = query(&ds.records, &state);
        assert!(!rows.is_empty(), "{} selects nothing", preset.label);
        assert!(rows.len() < ds.len(), "{} selects everything", preset.label);

        for row in &rows {
            let r = row.record;
            if let Some(kind) = preset.facility_type {
                assert_eq!(r.facility_kind(), Some(kind), "{}", r.name);
            }
            if let Some(setting) = preset.rural_urban {
                assert_eq!(r.rural_urban.as_deref(), Some(setting), "{}", r.name);
            }
            if let Some(service) = preset.service {
                assert!(
                    r.offered_services().iter().any(|s| has_word(s, service)),
                    "{} does not offer {service}",
                    r.name
                );
            }
            if preset.open24 {
                assert!(r.is_open_24h(), "{}", r.name);
            }
        }
    }
}

#[test]
fn emergency_preset_ignores_lookalike_words() {
    let emergency = PRESETS.iter().position(|p| p.label == "Emergency").unwrap();
    let records = vec![
        FacilityRecord {
            services: vec!["General".into()],
            ..facility("GP Surgery")
        },
        FacilityRecord {
            specialists: vec!["over-the-counter".into()],
            ..facility("Corner Pharmacy")
        },
        FacilityRecord {
            services: vec!["ER".into(), "Maternity".into()],
            ..facility("Casualty Hospital")
        },
    ];
    let rows = query(&records, &apply_preset(&FilterState::default(), emergency));
    assert_eq!(names(&rows), vec!["Casualty Hospital"]);

    let ds = embedded_snapshot();
    let on_snapshot = query(&ds.records, &apply_preset(&FilterState::default(), emergency));
    assert!(on_snapshot
        .iter()
        .all(|row| row.record.facility_kind() == Some("Hospital")));
}
