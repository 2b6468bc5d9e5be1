use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::filter::MatchPolicy;
use crate::data::loader::Source;
use crate::location::DEFAULT_ENDPOINT;

/// Path of an optional JSON config file.
pub const CONFIG_ENV: &str = "ZIMCARE_CONFIG";
/// Comma-separated source list overriding the configured one.
pub const SOURCES_ENV: &str = "ZIMCARE_SOURCES";

/// Runtime settings. Every field has a default, so a config file only
/// needs the keys it changes:
///
/// ```json
/// { "sources": ["data/hospitals.json", "https://mirror.example/hospitals.json"],
///   "search_debounce_ms": 60, "service_match": "exact" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Candidate dataset locations, tried in order.
    pub sources: Vec<Source>,
    /// Delay before typed search text is applied.
    pub search_debounce_ms: u64,
    pub service_match: MatchPolicy,
    /// IP geolocation endpoint for "Use my location".
    pub location_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                Source::parse("data/hospitals.json"),
                Source::parse("src/data/hospitals.json"),
            ],
            search_debounce_ms: 40,
            service_match: MatchPolicy::Contains,
            location_endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment. Problems are logged and
    /// the defaults used instead.
    pub fn load() -> Self {
        let file = std::env::var(CONFIG_ENV).ok().and_then(|path| {
            match std::fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))
                .and_then(|text| Self::from_json(&text))
            {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("Ignoring config file: {e:#}");
                    None
                }
            }
        });
        let config = file
            .unwrap_or_default()
            .with_sources_override(std::env::var(SOURCES_ENV).ok().as_deref());
        log::debug!("Config: {config:?}");
        config
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing config JSON")
    }

    /// Replace the source list with a comma-separated override, if it names
    /// at least one source.
    pub fn with_sources_override(mut self, raw: Option<&str>) -> Self {
        let sources: Vec<Source> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Source::parse)
            .collect();
        if !sources.is_empty() {
            self.sources = sources;
        }
        self
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_json(r#"{"service_match": "exact"}"#).unwrap();
        assert_eq!(config.service_match, MatchPolicy::Exact);
        assert_eq!(config.search_debounce_ms, 40);
        assert_eq!(config.sources, AppConfig::default().sources);
    }

    #[test]
    fn sources_from_file() {
        let config = AppConfig::from_json(
            r#"{"sources": ["local.json", "https://mirror.example/hospitals.json"]}"#,
        )
        .unwrap();
        assert_eq!(
            config.sources,
            vec![
                Source::parse("local.json"),
                Source::Url("https://mirror.example/hospitals.json".into()),
            ]
        );
    }

    #[test]
    fn env_override() {
        let config = AppConfig::default().with_sources_override(Some(" a.json , ,https://m/b.json"));
        assert_eq!(config.sources.len(), 2);

        let untouched = AppConfig::default().with_sources_override(Some(" , "));
        assert_eq!(untouched.sources, AppConfig::default().sources);
    }

    #[test]
    fn bad_policy_is_an_error() {
        assert!(AppConfig::from_json(r#"{"service_match": "fuzzy"}"#).is_err());
    }
}
