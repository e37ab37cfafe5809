//! 文字認識（OCR）
//!
//! 処理フロー:
//! 1. 画像バイト列のデコード（失敗はレコード単位のエラー）
//! 2. 前処理（グレースケール・ノイズ除去・二値化）
//! 3. OCRエンジンでテキスト化（失敗時は空文字列に縮退）

pub mod cache;
mod preprocess;
mod tesseract;

pub use cache::OcrCache;
pub use preprocess::{binarize, decode_image, median_filter_3x3, preprocess, PreprocessOptions};
pub use tesseract::TesseractCli;

use crate::error::Result;
use image::GrayImage;
use tracing::warn;

/// OCRエンジン
#[allow(async_fn_in_trait)]
pub trait OcrEngine {
    /// 前処理済み画像からテキストを読み取る（読めなければ空文字列でもよい）
    async fn recognize(&self, image: &GrayImage) -> Result<String>;
}

/// 画像バイト列からテキストを抽出する
///
/// デコード失敗は`Err`、認識失敗は警告ログを出して空文字列を返す。
pub async fn extract_text<O: OcrEngine>(
    bytes: &[u8],
    engine: &O,
    options: &PreprocessOptions,
) -> Result<String> {
    let decoded = decode_image(bytes)?;
    let prepared = preprocess(&decoded, options);

    match engine.recognize(&prepared).await {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(error = %e, "文字認識に失敗、空テキストとして続行");
            Ok(String::new())
        }
    }
}
