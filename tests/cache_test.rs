//! OCRキャッシュ機能テスト

use cert_points::ocr::cache::compute_hash;
use cert_points::ocr::OcrCache;
use tempfile::tempdir;

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = OcrCache::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = OcrCache::load(dir.path());
    let hash = compute_hash(b"certificate image bytes");
    cache.insert(hash.clone(), "NPTEL 8 week".to_string());
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = OcrCache::load(dir.path());
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get(&hash), Some("NPTEL 8 week"));
    assert!(loaded.get("nonexistent_hash").is_none());
}

/// キャッシュの上書き
#[test]
fn test_cache_overwrite() {
    let mut cache = OcrCache::default();
    cache.insert("same".to_string(), "first".to_string());
    cache.insert("same".to_string(), "second".to_string());

    assert_eq!(cache.get("same"), Some("second"));
    assert_eq!(cache.len(), 1);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(OcrCache::cache_path(dir.path()), "{ invalid json }").unwrap();

    assert!(OcrCache::load(dir.path()).is_empty());
}

/// バージョン不一致は空として扱う
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        OcrCache::cache_path(dir.path()),
        r#"{"version": 99, "entries": {"h": "text"}}"#,
    )
    .unwrap();

    assert!(OcrCache::load(dir.path()).is_empty());
}

/// キャッシュ削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    OcrCache::default().save(dir.path()).unwrap();

    assert!(OcrCache::clear(dir.path()).unwrap());
    assert!(!OcrCache::clear(dir.path()).unwrap());
}
