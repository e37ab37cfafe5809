//! tesseract CLI連携

use super::OcrEngine;
use crate::config::Config;
use crate::error::{CertPointsError, Result};
use image::{GrayImage, ImageFormat};
use tokio::process::Command;
use tracing::debug;

pub struct TesseractCli {
    command: String,
    page_seg_mode: u8,
}

impl TesseractCli {
    pub fn new(command: &str, page_seg_mode: u8) -> Self {
        Self {
            command: command.to_string(),
            page_seg_mode,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.tesseract_cmd, config.page_seg_mode)
    }
}

impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &GrayImage) -> Result<String> {
        // tesseractはファイル入力のため一時PNGに書き出す
        let temp = tempfile::Builder::new()
            .prefix("cert-points-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(temp.path(), ImageFormat::Png)
            .map_err(|e| CertPointsError::Recognition(format!("一時画像の保存に失敗: {}", e)))?;

        let psm = self.page_seg_mode.to_string();
        let output = Command::new(&self.command)
            .arg(temp.path())
            .arg("stdout")
            .args(["--psm", psm.as_str()])
            .output()
            .await
            .map_err(|e| CertPointsError::Recognition(format!("{} 実行エラー: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CertPointsError::Recognition(format!(
                "tesseract failed (code {:?}): {}",
                output.status.code(),
                stderr
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        let preview: String = text.chars().take(200).collect();
        debug!(chars = text.len(), preview = %preview, "OCR結果");

        Ok(text)
    }
}
