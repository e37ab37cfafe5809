use crate::error::{CertPointsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 実行時設定
///
/// 起動時に一度だけ読み込み、以降は読み取り専用で各コンポーネントに渡す。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SupabaseプロジェクトURL（PostgREST）
    pub supabase_url: Option<String>,
    pub api_key: Option<String>,
    /// 証明書テーブル名
    pub table: String,
    /// ローカルJSONのレコードファイル（指定時はPostgRESTの代わりに使用）
    pub records_file: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    /// tesseract実行ファイル
    pub tesseract_cmd: String,
    /// tesseract --psm
    pub page_seg_mode: u8,
    /// 二値化の閾値（これより明るい画素を白にする）
    pub binarize_threshold: u8,
    /// 3x3メディアンフィルタでノイズ除去
    pub denoise: bool,
    /// カテゴリカタログJSON（未指定時は組み込みカタログ）
    pub catalog_path: Option<PathBuf>,
    /// 結果書き込みの再試行回数
    pub report_retries: u32,
    pub retry_backoff_ms: u64,
    /// OCRテキストキャッシュの保存先
    pub ocr_cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            api_key: None,
            table: "certificates".into(),
            records_file: None,
            poll_interval_secs: 2,
            fetch_timeout_secs: 30,
            tesseract_cmd: "tesseract".into(),
            page_seg_mode: 6,
            binarize_threshold: 150,
            denoise: true,
            catalog_path: None,
            report_retries: 2,
            retry_backoff_ms: 500,
            ocr_cache_dir: None,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む（`path`未指定時は既定パス、存在しなければ既定値）
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else if path.is_some() {
            Err(CertPointsError::Config(format!(
                "設定ファイルが見つかりません: {}",
                config_path.display()
            )))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CertPointsError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("cert-points").join("config.json"))
    }

    pub fn get_supabase_url(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            return Ok(url);
        }

        self.supabase_url
            .clone()
            .ok_or_else(|| CertPointsError::Config("supabase_url が設定されていません".into()))
    }

    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("SUPABASE_KEY") {
            return Ok(key);
        }

        self.api_key.clone().ok_or(CertPointsError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String, path: Option<&Path>) -> Result<()> {
        self.api_key = Some(key);
        self.save(path)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_polling_setup() {
        let config = Config::default();
        assert_eq!(config.table, "certificates");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.page_seg_mode, 6);
        assert_eq!(config.binarize_threshold, 150);
        assert!(config.denoise);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"table": "certs", "report_retries": 0}"#).unwrap();
        assert_eq!(config.table, "certs");
        assert_eq!(config.report_retries, 0);
        assert_eq!(config.tesseract_cmd, "tesseract");
    }

    #[test]
    fn test_load_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(dir.path().join("missing.json").as_path()));
        assert!(matches!(result, Err(CertPointsError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.set_api_key("secret".into(), Some(path.as_path())).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
    }
}
