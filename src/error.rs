use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertPointsError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`cert-points config --set-api-key YOUR_KEY` または環境変数 SUPABASE_KEY で設定してください")]
    MissingApiKey,

    #[error("対応していないURLです: {0}")]
    InvalidUrl(String),

    #[error("画像取得エラー: {0}")]
    Fetch(String),

    #[error("画像取得エラー (HTTP {status}): {url}")]
    HttpStatus { status: u16, url: String },

    #[error("画像デコードエラー: {0}")]
    Decode(String),

    #[error("文字認識エラー: {0}")]
    Recognition(String),

    #[error("結果の書き込みに失敗: {0}")]
    Report(String),

    #[error("レコード取得エラー: {0}")]
    RecordSource(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] cert_points_common::Error),
}

/// 1レコード処理中の失敗区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    Decode,
    Recognition,
    Report,
    Other,
}

impl CertPointsError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CertPointsError::InvalidUrl(_)
            | CertPointsError::Fetch(_)
            | CertPointsError::HttpStatus { .. }
            | CertPointsError::Http(_) => FailureKind::Fetch,
            CertPointsError::Decode(_) => FailureKind::Decode,
            CertPointsError::Recognition(_) => FailureKind::Recognition,
            CertPointsError::Report(_) => FailureKind::Report,
            _ => FailureKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CertPointsError>;
