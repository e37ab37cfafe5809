//! 採点パイプライン
//!
//! 未処理レコードを1件ずつ 取得→デコード→OCR→正規化→照合→集計→書き込み する。
//! レコード単位の失敗は他のレコードに影響せず、ループも停止しない。

mod outcome;

pub use outcome::{CycleSummary, OutcomeStatus, RecordOutcome};

use crate::error::{CertPointsError, FailureKind, Result};
use crate::fetcher::ImageFetcher;
use crate::ocr::{self, cache, OcrCache, OcrEngine, PreprocessOptions};
use crate::record::{CertificateRecord, RecordSource};
use cert_points_common::{assess, Catalog, MatchedSet};
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// パイプラインの動作設定
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub preprocess: PreprocessOptions,
    /// 書き込み失敗時の再試行回数（初回を含まない）
    pub report_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preprocess: PreprocessOptions::default(),
            report_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&crate::config::Config> for PipelineOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            preprocess: PreprocessOptions::from(config),
            report_retries: config.report_retries,
            retry_backoff: config.retry_backoff(),
        }
    }
}

pub struct Pipeline<S, F, O> {
    source: S,
    fetcher: F,
    engine: O,
    catalog: Catalog,
    options: PipelineOptions,
    cache: Option<(PathBuf, OcrCache)>,
    student: Option<String>,
}

impl<S, F, O> Pipeline<S, F, O>
where
    S: RecordSource,
    F: ImageFetcher,
    O: OcrEngine,
{
    pub fn new(source: S, fetcher: F, engine: O, catalog: Catalog, options: PipelineOptions) -> Self {
        Self {
            source,
            fetcher,
            engine,
            catalog,
            options,
            cache: None,
            student: None,
        }
    }

    /// OCRテキストキャッシュを有効化
    pub fn with_cache(mut self, folder: PathBuf) -> Self {
        let cache = OcrCache::load(&folder);
        self.cache = Some((folder, cache));
        self
    }

    /// 指定学生のレコードだけを処理対象にする
    pub fn with_student(mut self, student_id: &str) -> Self {
        self.student = Some(student_id.to_string());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 1サイクル分の未処理レコードを処理
    ///
    /// 一覧取得自体に失敗した場合はログを出して空の結果を返す。
    pub async fn run_once(&mut self) -> Vec<RecordOutcome> {
        let listed = match &self.student {
            Some(student_id) => self.source.list_unprocessed_for_student(student_id).await,
            None => self.source.list_unprocessed().await,
        };
        let records = match listed {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "未処理レコードの取得に失敗");
                return Vec::new();
            }
        };

        if records.is_empty() {
            debug!("未処理レコードなし");
            return Vec::new();
        }
        info!(count = records.len(), "未処理レコードを取得");

        let mut outcomes = Vec::with_capacity(records.len());
        for record in &records {
            outcomes.push(self.process_record(record).await);
        }
        outcomes
    }

    /// 1レコードを処理
    pub async fn process_record(&mut self, record: &CertificateRecord) -> RecordOutcome {
        info!(id = %record.id, student = %record.student_id, "処理開始");

        let raw_text = match self.read_certificate(record).await {
            Ok(text) => text,
            Err(e) => {
                let status = match e.kind() {
                    FailureKind::Decode => OutcomeStatus::DecodeFailed,
                    _ => OutcomeStatus::FetchFailed,
                };
                warn!(id = %record.id, url = %record.certificate_url, error = %e, "証明書を読み取れません、次回再試行");
                return failed(record, status, None, MatchedSet::new(), e);
            }
        };

        let assessment = assess(&raw_text, &self.catalog);
        debug!(id = %record.id, text = %assessment.normalized_text, "正規化テキスト");

        if let Err(e) = self.report_with_retry(&record.id, assessment.score).await {
            error!(id = %record.id, score = assessment.score, error = %e, "結果の書き込みに失敗");
            return failed(
                record,
                OutcomeStatus::ReportFailed,
                Some(assessment.score),
                assessment.matched,
                e,
            );
        }

        info!(
            id = %record.id,
            student = %record.student_id,
            score = assessment.score,
            matched = ?assessment.matched,
            "採点完了"
        );

        RecordOutcome {
            record_id: record.id.clone(),
            student_id: record.student_id.clone(),
            status: OutcomeStatus::Processed,
            score: Some(assessment.score),
            matched: assessment.matched,
            error: None,
            finished_at: Utc::now(),
        }
    }

    /// 画像取得→OCR（キャッシュ有効時はヒットすればOCRを省略）
    async fn read_certificate(&mut self, record: &CertificateRecord) -> Result<String> {
        let bytes = self.fetcher.fetch(&record.certificate_url).await?;

        let hash = self.cache.as_ref().map(|_| cache::compute_hash(&bytes));
        if let (Some((_, cache)), Some(hash)) = (&self.cache, &hash) {
            if let Some(text) = cache.get(hash) {
                debug!(id = %record.id, "OCRキャッシュヒット");
                return Ok(text.to_string());
            }
        }

        let text = ocr::extract_text(&bytes, &self.engine, &self.options.preprocess).await?;

        if let (Some((folder, cache)), Some(hash)) = (&mut self.cache, hash) {
            cache.insert(hash, text.clone());
            if let Err(e) = cache.save(folder) {
                warn!(error = %e, "OCRキャッシュの保存に失敗");
            }
        }

        Ok(text)
    }

    async fn report_with_retry(&self, id: &str, score: u32) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.source.report_result(id, true, score).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.options.report_retries => {
                    attempt += 1;
                    warn!(id, attempt, error = %e, "書き込み失敗、再試行します");
                    tokio::time::sleep(self.options.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 停止要求が来るまでポーリングを繰り返す
    ///
    /// 停止要求はサイクルの実行中も監視し、最初のレコードより前に一度ポーリングされる。
    /// サイクル中に要求が来た場合はそのサイクルを最後まで処理してから停止する。
    /// 戻り値は完了したサイクル数。
    pub async fn run_until<Sd>(&mut self, poll_interval: Duration, shutdown: Sd) -> usize
    where
        Sd: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;
        let mut stopping = false;

        loop {
            let outcomes = {
                let cycle = self.run_once();
                tokio::pin!(cycle);
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        info!("停止要求を受信、現在のサイクル完了後に停止");
                        stopping = true;
                        cycle.await
                    }
                    outcomes = &mut cycle => outcomes,
                }
            };
            cycles += 1;

            let summary = CycleSummary::from_outcomes(&outcomes);
            if summary.total > 0 {
                info!(
                    cycle = cycles,
                    processed = summary.processed,
                    fetch_failed = summary.fetch_failed,
                    decode_failed = summary.decode_failed,
                    report_failed = summary.report_failed,
                    "サイクル完了"
                );
            }

            if stopping {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(cycles, "停止要求を受信");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }

        cycles
    }

    /// Ctrl-C まで常駐してポーリング
    pub async fn run_forever(&mut self, poll_interval: Duration) -> usize {
        info!(interval_secs = poll_interval.as_secs_f64(), "新しい証明書を待機中...");
        self.run_until(poll_interval, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                // シグナルを待てない環境では停止要求なしで回り続ける
                error!(error = %e, "Ctrl-C ハンドラの登録に失敗");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

fn failed(
    record: &CertificateRecord,
    status: OutcomeStatus,
    score: Option<u32>,
    matched: MatchedSet,
    error: CertPointsError,
) -> RecordOutcome {
    RecordOutcome {
        record_id: record.id.clone(),
        student_id: record.student_id.clone(),
        status,
        score,
        matched,
        error: Some(error.to_string()),
        finished_at: Utc::now(),
    }
}
