use cert_points_common::MatchedSet;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 1レコードの処理状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// 採点・書き込み完了
    Processed,
    /// 画像取得失敗（保存状態は変更なし）
    FetchFailed,
    /// 画像デコード失敗（保存状態は変更なし）
    DecodeFailed,
    /// 採点済みだが書き込み失敗（次回再選択される）
    ReportFailed,
}

/// 1レコードの処理結果
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub record_id: String,
    pub student_id: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "MatchedSet::is_empty")]
    pub matched: MatchedSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl RecordOutcome {
    pub fn is_processed(&self) -> bool {
        self.status == OutcomeStatus::Processed
    }
}

/// 1サイクルの集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub total: usize,
    pub processed: usize,
    pub fetch_failed: usize,
    pub decode_failed: usize,
    pub report_failed: usize,
    pub total_points: u64,
}

impl CycleSummary {
    pub fn from_outcomes(outcomes: &[RecordOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Processed => {
                    summary.processed += 1;
                    summary.total_points += u64::from(outcome.score.unwrap_or(0));
                }
                OutcomeStatus::FetchFailed => summary.fetch_failed += 1,
                OutcomeStatus::DecodeFailed => summary.decode_failed += 1,
                OutcomeStatus::ReportFailed => summary.report_failed += 1,
            }
        }

        summary
    }
}
