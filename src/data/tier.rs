//! Tier classification
//!
//! A record's tier is its explicit `tier` value when it has a recognised
//! one; otherwise the first rule of [`TIER_RULES`] that applies, falling
//! through to Tier 3. Absent bed counts never satisfy a threshold.

use std::collections::BTreeSet;

use super::model::{FacilityRecord, Tier};

/// Bed count from which a facility is Tier 1 regardless of type.
pub const TIER1_MIN_BEDS: u32 = 350;
/// Lower bound of the Tier 2 bed band `[120, 350)`.
pub const TIER2_MIN_BEDS: u32 = 120;

const TIER1_TYPE_KEYWORDS: &[&str] = &["central", "referral", "teaching", "university"];
const TIER2_TYPE_KEYWORDS: &[&str] = &["provincial", "general", "district"];
const CRITICAL_CARE_KEYWORDS: &[&str] = &[
    "oncology",
    "cardiology",
    "neurosurgery",
    "icu",
    "critical care",
    "trauma",
    "hematology",
    "neonatology",
];

/// Lowercased view of the record fields the rules look at.
struct TierInputs {
    bed_count: Option<u32>,
    capability_text: String,
    distinct_capabilities: usize,
    /// type, facility_type and category, each lowercased.
    classification: Vec<String>,
}

impl TierInputs {
    fn from_record(record: &FacilityRecord) -> Self {
        let caps = record.capabilities();
        let distinct: BTreeSet<String> = caps
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        let classification = [&record.kind, &record.facility_type, &record.category]
            .into_iter()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect();

        TierInputs {
            bed_count: record.bed_count,
            capability_text: caps.join(" ").to_lowercase(),
            distinct_capabilities: distinct.len(),
            classification,
        }
    }

    fn classified_as_any(&self, keywords: &[&str]) -> bool {
        self.classification
            .iter()
            .any(|text| keywords.iter().any(|k| text.contains(k)))
    }
}

/// One step of the tier cascade.
pub struct TierRule {
    pub name: &'static str,
    pub tier: Tier,
    applies: fn(&TierInputs) -> bool,
}

/// Priority-ordered rules, evaluated top-down; the first match wins.
pub static TIER_RULES: [TierRule; 6] = [
    TierRule {
        name: "referral-type",
        tier: Tier::T1,
        applies: referral_type,
    },
    TierRule {
        name: "large-bed-count",
        tier: Tier::T1,
        applies: large_bed_count,
    },
    TierRule {
        name: "critical-care",
        tier: Tier::T1,
        applies: critical_care,
    },
    TierRule {
        name: "secondary-type",
        tier: Tier::T2,
        applies: secondary_type,
    },
    TierRule {
        name: "medium-bed-count",
        tier: Tier::T2,
        applies: medium_bed_count,
    },
    TierRule {
        name: "multiple-services",
        tier: Tier::T2,
        applies: multiple_services,
    },
];

fn referral_type(i: &TierInputs) -> bool {
    i.classified_as_any(TIER1_TYPE_KEYWORDS)
}

fn large_bed_count(i: &TierInputs) -> bool {
    i.bed_count.is_some_and(|beds| beds >= TIER1_MIN_BEDS)
}

fn critical_care(i: &TierInputs) -> bool {
    CRITICAL_CARE_KEYWORDS
        .iter()
        .any(|k| i.capability_text.contains(k))
}

fn secondary_type(i: &TierInputs) -> bool {
    i.classified_as_any(TIER2_TYPE_KEYWORDS)
}

fn medium_bed_count(i: &TierInputs) -> bool {
    i.bed_count
        .is_some_and(|beds| (TIER2_MIN_BEDS..TIER1_MIN_BEDS).contains(&beds))
}

fn multiple_services(i: &TierInputs) -> bool {
    i.distinct_capabilities >= 2
}

/// Why a record received its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierReason {
    Explicit,
    Rule(&'static str),
    Default,
}

/// Tier of a record: explicit value first, then the rule cascade.
pub fn classify_tier(record: &FacilityRecord) -> Tier {
    classify_tier_with_reason(record).0
}

pub fn classify_tier_with_reason(record: &FacilityRecord) -> (Tier, TierReason) {
    if let Some(tier) = record.explicit_tier() {
        return (tier, TierReason::Explicit);
    }

    let inputs = TierInputs::from_record(record);
    TIER_RULES
        .iter()
        .find(|rule| (rule.applies)(&inputs))
        .map(|rule| (rule.tier, TierReason::Rule(rule.name)))
        .unwrap_or((Tier::T3, TierReason::Default))
}
