//! 証明書レコードの取得・結果書き込み
//!
//! - `PostgrestSource`: Supabase(PostgREST)の証明書テーブル
//! - `JsonFileSource`: ローカルのJSONファイル
//!
//! 複数ワーカーで並列に処理する場合は、processedフラグの
//! compare-and-set（楽観ロック）をレコードソース側が保証する必要がある。

mod json_file;
mod postgrest;

pub use json_file::JsonFileSource;
pub use postgrest::PostgrestSource;

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};

/// 証明書レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub student_id: String,

    /// 証明書画像のURL
    #[serde(rename = "certificate", default, deserialize_with = "null_as_default")]
    pub certificate_url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: bool,

    #[serde(rename = "activity_point", default, deserialize_with = "null_as_default")]
    pub score: u32,
}

impl CertificateRecord {
    pub fn new(id: &str, student_id: &str, certificate_url: &str) -> Self {
        Self {
            id: id.to_string(),
            student_id: student_id.to_string(),
            certificate_url: certificate_url.to_string(),
            processed: false,
            score: 0,
        }
    }
}

/// IDは数値・文字列どちらでも受け付ける
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("不正なID: {}", other))),
    }
}

/// nullは既定値として扱う
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// レコードソース
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    /// 未処理レコードを取得
    async fn list_unprocessed(&self) -> Result<Vec<CertificateRecord>>;

    /// 指定学生の未処理レコードのみ取得
    async fn list_unprocessed_for_student(&self, student_id: &str) -> Result<Vec<CertificateRecord>> {
        Ok(self
            .list_unprocessed()
            .await?
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect())
    }

    /// 処理結果を書き込む
    async fn report_result(&self, id: &str, processed: bool, score: u32) -> Result<()>;
}
