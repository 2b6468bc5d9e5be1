/// Data layer: facility records, loading, tiering and querying.
///
/// Architecture:
/// ```text
///  sources (paths / mirror URLs) ──┐
///                                  │  first parseable wins,
///  embedded snapshot ──────────────┤  else embedded (degraded)
///                                  ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → FacilityDataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ FacilityDataset  │  Vec<FacilityRecord>, unique values per column
///   └─────────────────┘  normalize: derived type, setting, typical services
///        │
///        ▼
///   ┌──────────┐   tier  (ordered rule list)
///   │  filter   │ ◄─ geo   (haversine distance)
///   └──────────┘   presets (quick filters → FilterState)
///        │
///        ▼
///   Vec<Enriched>  ordered rows for the presenter
/// ```

pub mod filter;
pub mod geo;
pub mod lenient;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod presets;
pub mod tier;
