//! Unit tests for CLI argument parsing and filtering.

use super::*;

use chrono::TimeZone;

fn sample_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn package(downloads: Option<u64>, published: Option<&str>) -> RegistryPackage {
    RegistryPackage {
        name: "sample".to_string(),
        downloads,
        latest_release_published_at: published.map(|s| s.to_string()),
    }
}

#[test]
fn test_parse_package_spec_defaults_to_latest() {
    assert_eq!(
        parse_package_spec("lodash").unwrap(),
        ("lodash".to_string(), "latest".to_string())
    );
}

#[test]
fn test_parse_package_spec_with_version() {
    assert_eq!(
        parse_package_spec("lodash@4.17.21").unwrap(),
        ("lodash".to_string(), "4.17.21".to_string())
    );
    assert_eq!(
        parse_package_spec("lodash@^4.0.0").unwrap(),
        ("lodash".to_string(), "^4.0.0".to_string())
    );
}

#[test]
fn test_parse_package_spec_scoped() {
    assert_eq!(
        parse_package_spec("@types/node").unwrap(),
        ("@types/node".to_string(), "latest".to_string())
    );
    assert_eq!(
        parse_package_spec("@types/node@20.11.0").unwrap(),
        ("@types/node".to_string(), "20.11.0".to_string())
    );
}

#[test]
fn test_parse_package_spec_invalid() {
    assert!(matches!(
        parse_package_spec(""),
        Err(VineError::InvalidPackageSpec { .. })
    ));
    assert!(matches!(
        parse_package_spec("@"),
        Err(VineError::InvalidPackageSpec { .. })
    ));
    assert!(matches!(
        parse_package_spec("lodash@"),
        Err(VineError::InvalidPackageSpec { .. })
    ));
}

#[test]
fn test_recency_cutoff_years_and_months() {
    let now = sample_time();
    assert_eq!(
        recency_cutoff("2y", now).unwrap(),
        Utc.with_ymd_and_hms(2022, 6, 15, 12, 0, 0).unwrap()
    );
    assert_eq!(
        recency_cutoff("6m", now).unwrap(),
        Utc.with_ymd_and_hms(2023, 12, 15, 12, 0, 0).unwrap()
    );
}

#[test]
fn test_recency_cutoff_weeks_and_days() {
    let now = sample_time();
    assert_eq!(
        recency_cutoff("3w", now).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 25, 12, 0, 0).unwrap()
    );
    assert_eq!(
        recency_cutoff("10d", now).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap()
    );
}

#[test]
fn test_recency_cutoff_is_case_insensitive() {
    let now = sample_time();
    assert_eq!(
        recency_cutoff("1Y", now).unwrap(),
        recency_cutoff("1y", now).unwrap()
    );
}

#[test]
fn test_recency_cutoff_rejects_malformed_input() {
    let now = sample_time();
    assert!(recency_cutoff("", now).is_err());
    assert!(recency_cutoff("y", now).is_err());
    assert!(recency_cutoff("12", now).is_err());
    assert!(recency_cutoff("5x", now).is_err());
    assert!(recency_cutoff("yesterday", now).is_err());
}

#[test]
fn test_passes_filters_no_filters() {
    assert!(passes_filters(&package(None, None), None, None));
    assert!(passes_filters(&package(Some(100), None), None, None));
}

#[test]
fn test_passes_filters_downloads() {
    let pkg = package(Some(500), None);
    assert!(passes_filters(&pkg, Some(100), None));
    assert!(!passes_filters(&pkg, Some(1000), None));

    // Unknown download counts are never filtered out.
    assert!(passes_filters(&package(None, None), Some(1000), None));
}

#[test]
fn test_passes_filters_recency() {
    let cutoff = Some(sample_time());
    let fresh = package(None, Some("2024-07-01T00:00:00Z"));
    let stale = package(None, Some("2024-01-01T00:00:00Z"));
    let unknown = package(None, None);
    let malformed = package(None, Some("not-a-date"));

    assert!(passes_filters(&fresh, None, cutoff));
    assert!(!passes_filters(&stale, None, cutoff));
    assert!(passes_filters(&unknown, None, cutoff));
    assert!(passes_filters(&malformed, None, cutoff));
}
