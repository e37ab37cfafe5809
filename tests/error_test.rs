//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use cert_points::error::{CertPointsError, FailureKind};
use cert_points::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    let err = result.unwrap_err();
    assert!(matches!(err, CertPointsError::FolderNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("records.json"), "[]").unwrap();

    let result = scanner::scan_folder(dir.path(), true);
    assert!(result.unwrap().is_empty());
}

/// CertPointsErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CertPointsError::Config("テスト設定エラー".to_string()),
        CertPointsError::InvalidUrl("ftp://x".to_string()),
        CertPointsError::Fetch("timeout".to_string()),
        CertPointsError::HttpStatus { status: 404, url: "https://x/a.png".to_string() },
        CertPointsError::Decode("不明な形式".to_string()),
        CertPointsError::Recognition("tesseract".to_string()),
        CertPointsError::Report("拒否".to_string()),
        CertPointsError::RecordSource("接続失敗".to_string()),
        CertPointsError::FolderNotFound("/path".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

#[test]
fn test_http_status_message_contains_code_and_url() {
    let err = CertPointsError::HttpStatus { status: 503, url: "https://cdn/c.png".to_string() };
    let display = err.to_string();
    assert!(display.contains("503"));
    assert!(display.contains("https://cdn/c.png"));
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = CertPointsError::MissingApiKey.to_string();
    assert!(display.contains("APIキー"));
    assert!(display.contains("SUPABASE_KEY"));
}

/// 失敗区分の分類
#[test]
fn test_failure_kind_classification() {
    assert_eq!(CertPointsError::InvalidUrl("x".into()).kind(), FailureKind::Fetch);
    assert_eq!(CertPointsError::Fetch("x".into()).kind(), FailureKind::Fetch);
    assert_eq!(
        CertPointsError::HttpStatus { status: 500, url: "u".into() }.kind(),
        FailureKind::Fetch
    );
    assert_eq!(CertPointsError::Decode("x".into()).kind(), FailureKind::Decode);
    assert_eq!(CertPointsError::Recognition("x".into()).kind(), FailureKind::Recognition);
    assert_eq!(CertPointsError::Report("x".into()).kind(), FailureKind::Report);
    assert_eq!(CertPointsError::Config("x".into()).kind(), FailureKind::Other);
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CertPointsError = io_err.into();

    assert!(matches!(err, CertPointsError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: CertPointsError = json_err.into();

    assert!(matches!(err, CertPointsError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = cert_points_common::Error::InvalidCatalog("アンカーが空です".to_string());
    let err: CertPointsError = common_err.into();

    assert!(matches!(err, CertPointsError::Common(_)));
    assert!(err.to_string().contains("アンカーが空です"));
}
