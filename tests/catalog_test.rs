//! カタログ読み込みテスト

use cert_points::config::Config;
use cert_points::error::CertPointsError;
use cert_points::load_catalog;
use cert_points_common::{assess, Catalog};
use tempfile::tempdir;

const CUSTOM_CATALOG: &str = r#"{
    "points": {"iedc": 30, "swayam + 4 week": 25},
    "compound": [
        {"category": "swayam + 4 week", "anchor": "swayam", "qualifiers": ["4 week", "4 weeks"]}
    ]
}"#;

#[test]
fn test_builtin_when_nothing_configured() {
    let catalog = load_catalog(None, &Config::default()).unwrap();
    assert_eq!(catalog, Catalog::builtin());
}

#[test]
fn test_override_path_wins_over_config() {
    let dir = tempdir().unwrap();
    let custom = dir.path().join("custom.json");
    std::fs::write(&custom, CUSTOM_CATALOG).unwrap();

    let mut config = Config::default();
    config.catalog_path = Some(dir.path().join("does-not-exist.json"));

    let catalog = load_catalog(Some(custom.as_path()), &config).unwrap();
    assert_eq!(catalog.points_for("iedc"), 30);

    let result = assess("SWAYAM online course (4 Weeks) - IEDC", &catalog);
    assert!(result.matched.contains("swayam + 4 week"));
    assert!(result.matched.contains("iedc"));
    assert_eq!(result.score, 55);
}

#[test]
fn test_invalid_catalog_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"compound": [{"category": "x", "anchor": "", "qualifiers": ["y"]}]}"#).unwrap();

    let err = load_catalog(Some(path.as_path()), &Config::default()).unwrap_err();
    assert!(matches!(err, CertPointsError::Common(_)));
}
