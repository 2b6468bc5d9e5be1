// tests/loader_fallback.rs
//
// Source chain behaviour against real files and injected fetchers.
//
use std::fs;
use std::path::PathBuf;

use anyhow::bail;
use zimcare::data::loader::{embedded_snapshot, load, load_file, load_with, Origin, Source};
use zimcare::error::LoadError;

/// A scratch file unique to this test process.
fn scratch(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("zimcare-tests-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn every_source_failing_yields_degraded_snapshot() {
    let sources = vec![
        Source::parse("does/not/exist.json"),
        Source::parse("https://mirror.invalid/hospitals.json"),
    ];
    let outcome = load_with(&sources, |s| bail!("{s} unreachable"));

    assert!(outcome.is_degraded());
    assert_eq!(outcome.origin, Origin::Embedded);
    assert_eq!(outcome.dataset.len(), embedded_snapshot().len());
    match outcome.unavailable {
        Some(LoadError::DataUnavailable { failures }) => {
            assert_eq!(failures.len(), 2);
            assert!(failures[0].to_string().starts_with("does/not/exist.json"));
        }
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
}

#[test]
fn no_sources_at_all_is_degraded() {
    let outcome = load_with(&[], |_| unreachable!());
    assert!(outcome.is_degraded());
}

#[test]
fn local_file_after_missing_one() {
    let good = scratch(
        "good.json",
        r#"[{"id": "a", "name": "Alpha Clinic", "province": "Harare"},
            {"id": "b", "name": "Beta Hospital", "province": "Midlands", "bed_count": 200}]"#,
    );
    let sources = vec![
        Source::Path(good.with_file_name("missing.json")),
        Source::Path(good.clone()),
    ];
    let outcome = load(&sources);

    assert!(!outcome.is_degraded());
    assert_eq!(outcome.origin, Origin::Source(Source::Path(good)));
    assert_eq!(outcome.dataset.len(), 2);
}

#[test]
fn unparseable_file_falls_through() {
    let broken = scratch("broken.json", "<html>502 Bad Gateway</html>");
    let csv = scratch(
        "mirror.csv",
        "name,province,services\nChitungwiza Central Hospital,Harare,ER; ICU\n",
    );
    let outcome = load(&[Source::Path(broken), Source::Path(csv)]);

    assert!(!outcome.is_degraded());
    assert_eq!(outcome.dataset.records[0].services, vec!["ER", "ICU"]);
}

#[test]
fn opened_file_reports_errors() {
    let broken = scratch("opened.json", "{}");
    assert!(load_file(&broken).is_err());
    assert!(load_file(&broken.with_file_name("absent.json")).is_err());
}
