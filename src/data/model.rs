use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Deserialize;

use super::geo::GeoPoint;
use super::{lenient, normalize};

// ---------------------------------------------------------------------------
// Tier – coarse capability/capacity classification
// ---------------------------------------------------------------------------

/// Facility tier. `T1` is the highest acuity / referral capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    T1,
    T2,
    T3,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::T1, Tier::T2, Tier::T3];

    /// Parse the spellings found in the wild: `T1`, `Tier 1`, `tier1`, `1`.
    pub fn parse(raw: &str) -> Option<Tier> {
        let compact: String = raw
            .trim()
            .to_ascii_lowercase()
            .replace("tier", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let digits = compact.strip_prefix('t').unwrap_or(&compact);
        match digits {
            "1" => Some(Tier::T1),
            "2" => Some(Tier::T2),
            "3" => Some(Tier::T3),
            _ => None,
        }
    }

    /// Short badge label, e.g. `T1`.
    pub fn short(&self) -> &'static str {
        match self {
            Tier::T1 => "T1",
            Tier::T2 => "T2",
            Tier::T3 => "T3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::T1 => write!(f, "Tier 1"),
            Tier::T2 => write!(f, "Tier 2"),
            Tier::T3 => write!(f, "Tier 3"),
        }
    }
}

// ---------------------------------------------------------------------------
// FacilityRecord – one entry of the dataset
// ---------------------------------------------------------------------------

/// A hospital, clinic, pharmacy or other facility as loaded.
///
/// Records are read-only once loaded. Fields that may be spelled two ways in
/// the source data (`type` / `facility_type`, `city` / `district`,
/// `latitude` / `lat`, ...) are kept side by side and resolved through the
/// accessor methods, so a record carrying both spellings still decodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FacilityRecord {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub province: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub district: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub lon: Option<f64>,

    /// Older datasets use `type` for a mix of ownership and kind
    /// (`"public referral"`, `"mission"`).
    #[serde(rename = "type", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub facility_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub ownership: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub rural_urban: Option<String>,

    #[serde(deserialize_with = "lenient::opt_bed_count")]
    pub bed_count: Option<u32>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub specialists: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub services: Vec<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub whatsapp: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub website: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub manager: Option<String>,

    #[serde(deserialize_with = "lenient::opt_bool")]
    pub open_24h: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub operating_hours: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub accepted_payments: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub medical_aids: Vec<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub last_verified: Option<String>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub verified: Option<bool>,

    /// Explicit tier as written in the source, if any.
    #[serde(deserialize_with = "lenient::opt_string")]
    pub tier: Option<String>,

    /// Filled in by [`normalize::fill_derived`] for records that declare
    /// no services.
    #[serde(skip)]
    pub typical_services: Vec<String>,
}

impl FacilityRecord {
    /// City, falling back to district.
    pub fn locality(&self) -> Option<&str> {
        self.city.as_deref().or(self.district.as_deref())
    }

    /// Facility type, falling back to the legacy `type` field.
    pub fn facility_kind(&self) -> Option<&str> {
        self.facility_type.as_deref().or(self.kind.as_deref())
    }

    /// Declared services followed by specialists, without repeats
    /// (compared case-insensitively, first spelling kept).
    pub fn capabilities(&self) -> Vec<&str> {
        dedup_ignore_case(self.services.iter().chain(&self.specialists))
    }

    /// Capabilities plus the typical service lines derived for the
    /// facility type. Drives search and the service filter; tiering only
    /// looks at [`capabilities`](Self::capabilities).
    pub fn offered_services(&self) -> Vec<&str> {
        dedup_ignore_case(
            self.services
                .iter()
                .chain(&self.specialists)
                .chain(&self.typical_services),
        )
    }

    pub fn payments(&self) -> &[String] {
        if self.accepted_payments.is_empty() {
            &self.medical_aids
        } else {
            &self.accepted_payments
        }
    }

    /// Valid WGS84 position; `None` unless both coordinates are present.
    pub fn coordinates(&self) -> Option<GeoPoint> {
        let lat = self.latitude.or(self.lat)?;
        let lon = self.longitude.or(self.lon)?;
        GeoPoint::new(lat, lon)
    }

    /// Explicit tier, when the source spells it in a recognised way.
    pub fn explicit_tier(&self) -> Option<Tier> {
        let raw = self.tier.as_deref()?;
        let parsed = Tier::parse(raw);
        if parsed.is_none() {
            log::debug!("{}: ignoring unrecognised tier {raw:?}", self.name);
        }
        parsed
    }

    /// Open around the clock, by explicit flag or by the hours text.
    pub fn is_open_24h(&self) -> bool {
        if let Some(flag) = self.open_24h {
            return flag;
        }
        self.operating_hours
            .as_deref()
            .is_some_and(hours_mean_24h)
    }

    /// Stable identity: `id` when present, else normalised name + locality.
    pub fn dedup_key(&self) -> String {
        match &self.id {
            Some(id) => format!("id:{id}"),
            None => format!(
                "name:{}::{}",
                normalize_text(&self.name),
                normalize_text(self.locality().unwrap_or(""))
            ),
        }
    }
}

/// `"24 hours"`, `"24/7"`, `"24hrs"`, `"Open 24h"`.
fn hours_mean_24h(hours: &str) -> bool {
    let text = normalize_text(hours);
    let tokens: Vec<&str> = text.split(' ').collect();
    tokens.iter().enumerate().any(|(i, tok)| match *tok {
        "24h" | "24hr" | "24hrs" | "247" => true,
        "24" => matches!(
            tokens.get(i + 1).copied(),
            Some("7" | "h" | "hr" | "hrs" | "hour" | "hours")
        ),
        _ => false,
    })
}

fn dedup_ignore_case<'a>(items: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

/// Lowercase, replace punctuation with spaces and collapse whitespace.
pub fn normalize_text(value: &str) -> String {
    let cleaned: String = value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Column – the filterable text columns of a record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Province,
    Ownership,
    FacilityType,
    Category,
    RuralUrban,
    Service,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Province,
        Column::Ownership,
        Column::FacilityType,
        Column::Category,
        Column::RuralUrban,
        Column::Service,
    ];

    /// Values of this column on one record.
    pub fn values<'a>(&self, record: &'a FacilityRecord) -> Vec<&'a str> {
        match self {
            Column::Province => record.province.as_deref().into_iter().collect(),
            Column::Ownership => record.ownership.as_deref().into_iter().collect(),
            Column::FacilityType => record.facility_kind().into_iter().collect(),
            Column::Category => record.category.as_deref().into_iter().collect(),
            Column::RuralUrban => record.rural_urban.as_deref().into_iter().collect(),
            Column::Service => record.offered_services(),
        }
    }
}

// ---------------------------------------------------------------------------
// FacilityDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct FacilityDataset {
    /// All facilities, in source order.
    pub records: Vec<FacilityRecord>,
    /// For each filterable column the sorted set of unique values.
    pub unique_values: BTreeMap<Column, BTreeSet<String>>,
}

impl FacilityDataset {
    /// Build column indices, dropping nameless records and later duplicates
    /// of an already seen id (or name + locality when there is no id).
    /// Kept records get their derived fields filled in.
    pub fn from_records(records: Vec<FacilityRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());

        for mut record in records {
            if record.name.is_empty() {
                log::warn!("Skipping facility without a name (id {:?})", record.id);
                continue;
            }
            if !seen.insert(record.dedup_key()) {
                log::warn!("Skipping duplicate facility {:?}", record.name);
                continue;
            }
            normalize::fill_derived(&mut record);
            kept.push(record);
        }

        let mut unique_values: BTreeMap<Column, BTreeSet<String>> = BTreeMap::new();
        for record in &kept {
            for column in Column::ALL {
                for value in column.values(record) {
                    unique_values
                        .entry(column)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }

        FacilityDataset {
            records: kept,
            unique_values,
        }
    }

    /// Sorted unique values of a column (empty when the column never occurs).
    pub fn values(&self, column: Column) -> impl Iterator<Item = &str> {
        self.unique_values
            .get(&column)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
