//! Supabase(PostgREST)の証明書テーブル

use super::{CertificateRecord, RecordSource};
use crate::config::Config;
use crate::error::{CertPointsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use tracing::debug;

pub struct PostgrestSource {
    client: reqwest::Client,
    base_url: String,
    table: String,
}

impl PostgrestSource {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| CertPointsError::Config(format!("APIキーが不正です: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| CertPointsError::Config(format!("APIキーが不正です: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.get_supabase_url()?, &config.get_api_key()?, &config.table)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// 未処理レコードを取得（`filters`はPostgRESTの追加条件）
    async fn select_unprocessed(&self, filters: &[(&str, String)]) -> Result<Vec<CertificateRecord>> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("processed", "eq.false")])
            .query(filters)
            .send()
            .await
            .map_err(|e| CertPointsError::RecordSource(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CertPointsError::RecordSource(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let records: Vec<CertificateRecord> = response
            .json()
            .await
            .map_err(|e| CertPointsError::RecordSource(format!("レスポンス解析失敗: {}", e)))?;
        debug!(count = records.len(), table = %self.table, "未処理レコード取得");
        Ok(records)
    }
}

impl RecordSource for PostgrestSource {
    async fn list_unprocessed(&self) -> Result<Vec<CertificateRecord>> {
        self.select_unprocessed(&[]).await
    }

    async fn list_unprocessed_for_student(&self, student_id: &str) -> Result<Vec<CertificateRecord>> {
        self.select_unprocessed(&[("student_id", format!("eq.{}", student_id))]).await
    }

    async fn report_result(&self, id: &str, processed: bool, score: u32) -> Result<()> {
        let id_filter = format!("eq.{}", id);
        let response = self
            .client
            .patch(self.table_url())
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&json!({ "processed": processed, "activity_point": score }))
            .send()
            .await
            .map_err(|e| CertPointsError::Report(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CertPointsError::Report(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        // return=representation では更新行が返る。空なら該当行なし
        let updated: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| CertPointsError::Report(format!("レスポンス解析失敗: {}", e)))?;
        if updated.is_empty() {
            return Err(CertPointsError::Report(format!("更新対象のレコードがありません: id={}", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let source = PostgrestSource::new("https://example.supabase.co/", "key", "certificates").unwrap();
        assert_eq!(source.table_url(), "https://example.supabase.co/rest/v1/certificates");
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let result = PostgrestSource::new("https://example.supabase.co", "bad\nkey", "certificates");
        assert!(matches!(result, Err(CertPointsError::Config(_))));
    }
}
