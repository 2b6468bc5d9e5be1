use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::model::{FacilityDataset, FacilityRecord};
use crate::error::LoadError;

/// Snapshot compiled into the binary, used when no source is reachable.
const EMBEDDED_SNAPSHOT: &str = include_str!("../../data/hospitals.json");

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One candidate location of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` / `https://` strings are mirrors, anything else a path.
    pub fn parse(raw: &str) -> Source {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }

    pub fn format(&self) -> Format {
        let name = match self {
            Source::Path(p) => p.to_string_lossy().into_owned(),
            Source::Url(u) => u.split(['?', '#']).next().unwrap_or_default().to_string(),
        };
        Format::from_name(&name)
    }
}

impl From<String> for Source {
    fn from(raw: String) -> Self {
        Source::parse(&raw)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => write!(f, "{u}"),
        }
    }
}

/// Serialisation of a dataset document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Dispatch by extension; JSON unless the name ends in `.csv`.
    pub fn from_name(name: &str) -> Format {
        if name.to_ascii_lowercase().ends_with(".csv") {
            Format::Csv
        } else {
            Format::Json
        }
    }
}

// ---------------------------------------------------------------------------
// Load outcome
// ---------------------------------------------------------------------------

/// Where the active dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Source(Source),
    /// A file the user opened explicitly.
    File(PathBuf),
    /// The compiled-in snapshot; the live data was unavailable.
    Embedded,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub dataset: FacilityDataset,
    pub origin: Origin,
    /// Set when every source failed and the snapshot is in use.
    pub unavailable: Option<LoadError>,
}

impl LoadOutcome {
    pub fn is_degraded(&self) -> bool {
        self.origin == Origin::Embedded
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Try each source in order with the default transport.
pub fn load(sources: &[Source]) -> LoadOutcome {
    load_with(sources, fetch_source)
}

/// Try each source in order; the first one that fetches and parses wins.
///
/// No retries within a source and no merging across sources. When every
/// source fails the embedded snapshot is returned, flagged as degraded.
pub fn load_with<F>(sources: &[Source], fetch: F) -> LoadOutcome
where
    F: Fn(&Source) -> Result<String>,
{
    let mut failures = Vec::new();

    for source in sources {
        let attempt = fetch(source).and_then(|text| parse_dataset(&text, source.format()));
        match attempt {
            Ok(dataset) => {
                log::info!("Loaded {} facilities from {source}", dataset.len());
                return LoadOutcome {
                    dataset,
                    origin: Origin::Source(source.clone()),
                    unavailable: None,
                };
            }
            Err(e) => {
                log::warn!("Dataset source {source} failed: {e:#}");
                failures.push(LoadError::Source {
                    location: source.clone(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    let unavailable = LoadError::DataUnavailable { failures };
    log::warn!("{unavailable}; using embedded snapshot");
    LoadOutcome {
        dataset: embedded_snapshot(),
        origin: Origin::Embedded,
        unavailable: Some(unavailable),
    }
}

/// Read a local path or GET a mirror URL. Non-2xx responses are errors.
pub fn fetch_source(source: &Source) -> Result<String> {
    match source {
        Source::Path(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        Source::Url(url) => {
            let response = ureq::get(url)
                .set("User-Agent", concat!("zimcare/", env!("CARGO_PKG_VERSION")))
                .call()
                .map_err(|e| anyhow::anyhow!("GET {url}: {e}"))?;
            response
                .into_string()
                .with_context(|| format!("reading body of {url}"))
        }
    }
}

/// Load one file chosen by the user. Errors are reported, not masked.
pub fn load_file(path: &Path) -> Result<FacilityDataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_dataset(&text, Format::from_name(&path.to_string_lossy()))
}

/// The compiled-in dataset.
pub fn embedded_snapshot() -> FacilityDataset {
    match parse_json(EMBEDDED_SNAPSHOT) {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Embedded snapshot is unreadable: {e:#}");
            FacilityDataset::default()
        }
    }
}

pub fn parse_dataset(text: &str, format: Format) -> Result<FacilityDataset> {
    match format {
        Format::Json => parse_json(text),
        Format::Csv => parse_csv(text),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected shape: a top-level array of facility objects.
///
/// ```json
/// [
///   { "id": "mpilo-central-hospital-bulawayo", "name": "Mpilo Central Hospital",
///     "province": "Bulawayo", "bed_count": 1000, "specialists": ["oncology"] },
///   ...
/// ]
/// ```
fn parse_json(text: &str) -> Result<FacilityDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let records = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| match row.as_object() {
            Some(obj) => decode_record(obj.clone(), i),
            None => {
                log::warn!("Row {i} is not a JSON object; skipped");
                None
            }
        })
        .collect();

    Ok(FacilityDataset::from_records(records))
}

fn decode_record(obj: Map<String, JsonValue>, row: usize) -> Option<FacilityRecord> {
    match serde_json::from_value::<FacilityRecord>(JsonValue::Object(obj)) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("Row {row}: unreadable facility ({e}); skipped");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with record field names. List fields
/// (`services`, `specialists`, `accepted_payments`) hold delimited values:
/// `"ER; Maternity; Lab"`. Empty or missing cells mean "unknown"; rows the
/// reader cannot decode at all are skipped.
fn parse_csv(text: &str) -> Result<FacilityDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("CSV row {row_no}: {e}; skipped");
                continue;
            }
        };

        let obj: Map<String, JsonValue> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(h, cell)| (h.clone(), JsonValue::String(cell.to_string())))
            .collect();

        if let Some(record) = decode_record(obj, row_no) {
            records.push(record);
        }
    }

    Ok(FacilityDataset::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    use crate::data::model::Column;

    #[test]
    fn sources_parse_by_scheme_and_extension() {
        assert_eq!(
            Source::parse("data/hospitals.json"),
            Source::Path(PathBuf::from("data/hospitals.json"))
        );
        let mirror = Source::parse(" https://example.org/hospitals.csv?v=2 ");
        assert_eq!(mirror, Source::Url("https://example.org/hospitals.csv?v=2".into()));
        assert_eq!(mirror.format(), Format::Csv);
        assert_eq!(Source::parse("x.JSON").format(), Format::Json);
    }

    #[test]
    fn embedded_snapshot_is_usable() {
        let ds = embedded_snapshot();
        assert!(!ds.is_empty());
        assert!(ds.values(Column::Province).any(|p| p == "Harare"));
    }

    #[test]
    fn first_parseable_source_wins() {
        let sources = vec![
            Source::parse("missing.json"),
            Source::parse("broken.json"),
            Source::parse("good.json"),
            Source::parse("never-tried.json"),
        ];
        let outcome = load_with(&sources, |s| match s.to_string().as_str() {
            "missing.json" => bail!("404"),
            "broken.json" => Ok("{ not json".into()),
            "good.json" => Ok(r#"[{"name": "Only One"}]"#.into()),
            other => panic!("tried {other} after a success"),
        });

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.origin, Origin::Source(sources[2].clone()));
        assert_eq!(outcome.dataset.len(), 1);
        assert!(outcome.unavailable.is_none());
    }

    #[test]
    fn object_root_is_not_a_dataset() {
        assert!(parse_dataset(r#"{"name": "x"}"#, Format::Json).is_err());
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let ds = parse_dataset(
            r#"[42, {"name": "Kept", "bed_count": "lots"}, {"province": "Harare"}]"#,
            Format::Json,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].bed_count, None);
    }

    #[test]
    fn csv_rows() {
        let text = "name,province,bed_count,services,open_24h,latitude,longitude\n\
                    Makumbe Rural Clinic,Mashonaland East,,OPD; MCH,no,,\n\
                    Gweru Provincial Hospital,Midlands,350,ER;ICU,yes,-19.45,29.82\n";
        let ds = parse_dataset(text, Format::Csv).unwrap();
        assert_eq!(ds.len(), 2);

        let clinic = &ds.records[0];
        assert_eq!(clinic.services, vec!["OPD", "MCH"]);
        assert_eq!(clinic.bed_count, None);
        assert!(!clinic.is_open_24h());
        assert!(clinic.coordinates().is_none());

        let gweru = &ds.records[1];
        assert_eq!(gweru.bed_count, Some(350));
        assert!(gweru.is_open_24h());
        assert!(gweru.coordinates().is_some());
    }

    #[test]
    fn ragged_csv_rows_are_kept() {
        let text = "name,province,services\n\
                    A Clinic,Harare,OPD\n\
                    B Clinic,Midlands\n\
                    C Clinic,Masvingo,MCH,extra\n";
        let ds = parse_dataset(text, Format::Csv).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[1].province.as_deref(), Some("Midlands"));
        assert!(ds.records[1].services.is_empty());
        assert_eq!(ds.records[2].services, vec!["MCH"]);
    }
}
