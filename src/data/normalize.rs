//! Fields derived once, when a dataset is built.
//!
//! Source data rarely says what kind of facility a record is or whether it
//! is rural, and mostly lists specialties rather than service lines. The
//! quick filters need all three, so they are inferred here from the name,
//! category, legacy `type` and locality. Values present in the source are
//! never overwritten.

use super::model::{normalize_text, FacilityRecord};

/// Cities and towns treated as urban. Any other known locality is rural.
const URBAN_CENTRES: &[&str] = &[
    "harare",
    "bulawayo",
    "chitungwiza",
    "epworth",
    "ruwa",
    "norton",
    "gweru",
    "mutare",
    "masvingo",
    "kwekwe",
    "queque",
    "redcliff",
    "kadoma",
    "chegutu",
    "chinhoyi",
    "bindura",
    "marondera",
    "rusape",
    "kariba",
    "karoi",
    "hwange",
    "victoria falls",
    "vic falls",
    "gwanda",
    "beitbridge",
    "zvishavane",
    "shurugwi",
    "chiredzi",
    "plumtree",
];

/// Keyword → facility type. Tried against the name, then the category,
/// then the legacy `type`; first hit wins.
const FACILITY_TYPES: &[(&str, &str)] = &[
    ("pharmacy", "Pharmacy"),
    ("optician", "Optician"),
    ("dental", "Dental Clinic"),
    ("laboratory", "Lab"),
    ("imaging", "Imaging Centre"),
    ("hospital", "Hospital"),
    ("clinic", "Clinic"),
];

const UNKNOWN_TYPE: &str = "Health Facility";

const CENTRAL_SERVICES: &[&str] = &["ER", "Maternity", "Theatre", "ICU", "Lab", "X-Ray", "Inpatient"];
const PROVINCIAL_SERVICES: &[&str] = &["ER", "Maternity", "Theatre", "Lab", "X-Ray", "Inpatient"];
const DISTRICT_SERVICES: &[&str] = &["ER", "Maternity", "Lab", "Inpatient"];
const CLINIC_SERVICES: &[&str] = &["OPD", "MCH", "Immunisation", "HIV"];
const PHARMACY_SERVICES: &[&str] = &["Dispensary"];

/// Fill `facility_type`, `rural_urban` and `typical_services` where the
/// source left them empty.
pub fn fill_derived(record: &mut FacilityRecord) {
    if record.facility_type.is_none() {
        record.facility_type = Some(facility_type_of(record).to_string());
    }
    if let Some(setting) = setting_of(record) {
        record.rural_urban = Some(setting);
    }
    if record.services.is_empty() {
        let kind = record.facility_type.as_deref().unwrap_or(UNKNOWN_TYPE);
        record.typical_services = typical_services(record, kind)
            .iter()
            .map(|s| s.to_string())
            .collect();
    }
}

/// Coarse facility type from name, category and legacy `type`.
pub fn facility_type_of(record: &FacilityRecord) -> &'static str {
    [Some(&record.name), record.category.as_ref(), record.kind.as_ref()]
        .into_iter()
        .flatten()
        .map(|text| normalize_text(text))
        .find_map(|text| {
            FACILITY_TYPES
                .iter()
                .find(|(keyword, _)| text.contains(*keyword))
                .map(|(_, label)| *label)
        })
        .unwrap_or(UNKNOWN_TYPE)
}

/// `Urban`, `Rural` or `Peri-Urban`. An explicit value is title-cased;
/// returns `None` only when it is already in that form.
pub fn setting_of(record: &FacilityRecord) -> Option<String> {
    if let Some(explicit) = record.rural_urban.as_deref() {
        let titled = title_case(explicit);
        return (titled != explicit).then_some(titled);
    }

    let locality = normalize_text(record.locality().unwrap_or(""));
    let setting = if URBAN_CENTRES.contains(&locality.as_str()) {
        "Urban"
    } else if normalize_text(&record.name).contains("rural") {
        "Rural"
    } else if record
        .category
        .as_deref()
        .is_some_and(|c| normalize_text(c).contains("clinic"))
    {
        "Rural"
    } else if !locality.is_empty() {
        "Rural"
    } else {
        "Peri-Urban"
    };
    Some(setting.to_string())
}

/// Service lines a facility of this kind usually offers.
fn typical_services(record: &FacilityRecord, kind: &str) -> &'static [&'static str] {
    let text = [Some(&record.name), record.kind.as_ref(), record.category.as_ref()]
        .into_iter()
        .flatten()
        .map(|t| normalize_text(t))
        .collect::<Vec<_>>()
        .join(" ");
    let mission = [record.kind.as_deref(), record.ownership.as_deref()]
        .into_iter()
        .flatten()
        .any(|t| {
            let t = t.to_lowercase();
            t.contains("mission") || t.contains("church")
        });

    if kind == "Hospital" && text.contains("central") {
        CENTRAL_SERVICES
    } else if kind == "Hospital" && text.contains("provincial") {
        PROVINCIAL_SERVICES
    } else if kind == "Hospital" && (text.contains("district") || mission) {
        DISTRICT_SERVICES
    } else if kind == "Clinic" {
        CLINIC_SERVICES
    } else if kind == "Pharmacy" {
        PHARMACY_SERVICES
    } else {
        &[]
    }
}

fn title_case(text: &str) -> String {
    text.trim()
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility(name: &str, category: &str, kind: &str, city: &str) -> FacilityRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        FacilityRecord {
            name: name.into(),
            category: opt(category),
            kind: opt(kind),
            city: opt(city),
            ..Default::default()
        }
    }

    #[test]
    fn type_from_name_before_category() {
        assert_eq!(facility_type_of(&facility("The Avenues Clinic", "hospital", "private", "")), "Clinic");
        assert_eq!(facility_type_of(&facility("City Dental Clinic", "dental_clinic", "", "")), "Dental Clinic");
        assert_eq!(facility_type_of(&facility("Opticare Opticians", "optician", "", "")), "Optician");
        assert_eq!(facility_type_of(&facility("Borrowdale Trauma Centre", "hospital", "", "")), "Hospital");
        assert_eq!(facility_type_of(&facility("Baines Imaging Group", "imaging_centre", "", "")), "Imaging Centre");
        assert_eq!(facility_type_of(&facility("Somewhere", "", "public", "")), "Health Facility");
    }

    #[test]
    fn explicit_values_survive() {
        let mut r = facility("Mpilo Central Hospital", "hospital", "public referral", "Bulawayo");
        r.facility_type = Some("Central Hospital".into());
        r.rural_urban = Some("peri-urban".into());
        r.services = vec!["Oncology".into()];
        fill_derived(&mut r);
        assert_eq!(r.facility_type.as_deref(), Some("Central Hospital"));
        assert_eq!(r.rural_urban.as_deref(), Some("Peri-Urban"));
        assert!(r.typical_services.is_empty());
    }

    #[test]
    fn settings() {
        let setting = |r: &FacilityRecord| setting_of(r).unwrap();
        assert_eq!(setting(&facility("Harare Central Hospital", "hospital", "", "Harare")), "Urban");
        assert_eq!(setting(&facility("Victoria Falls Hospital", "hospital", "", "Victoria Falls")), "Urban");
        assert_eq!(setting(&facility("Murewa District Hospital", "hospital", "", "Murewa")), "Rural");
        assert_eq!(setting(&facility("Makumbe Rural Clinic", "", "", "")), "Rural");
        assert_eq!(setting(&facility("Unplaced", "hospital", "", "")), "Peri-Urban");
        assert_eq!(setting_of(&FacilityRecord { rural_urban: Some("Rural".into()), ..Default::default() }), None);
    }

    #[test]
    fn typical_services_follow_the_grade() {
        let derived = |name: &str, kind: &str| {
            let mut r = facility(name, "hospital", kind, "");
            fill_derived(&mut r);
            r.typical_services
        };
        assert!(derived("Harare Central Hospital", "public referral").contains(&"ICU".to_string()));
        assert!(!derived("Gweru Provincial Hospital", "public").contains(&"ICU".to_string()));
        assert_eq!(derived("Karanda Mission Hospital", "mission"), DISTRICT_SERVICES);
        assert_eq!(derived("West End Hospital", "private"), Vec::<String>::new());

        let mut pharmacy = facility("Avondale Pharmacy", "pharmacy", "private", "Harare");
        fill_derived(&mut pharmacy);
        assert_eq!(pharmacy.typical_services, vec!["Dispensary"]);
    }
}
