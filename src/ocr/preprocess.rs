//! OCR前処理

use crate::error::{CertPointsError, Result};
use image::{DynamicImage, GrayImage, Luma};

/// 前処理オプション
#[derive(Debug, Clone, Copy)]
pub struct PreprocessOptions {
    /// 3x3メディアンフィルタを適用する
    pub denoise: bool,
    /// 二値化の閾値（これより大きい画素を白にする）
    pub threshold: u8,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            denoise: true,
            threshold: 150,
        }
    }
}

impl From<&crate::config::Config> for PreprocessOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            denoise: config.denoise,
            threshold: config.binarize_threshold,
        }
    }
}

/// 画像バイト列をデコード
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(CertPointsError::Decode("空のデータ".into()));
    }
    image::load_from_memory(bytes).map_err(|e| CertPointsError::Decode(e.to_string()))
}

/// グレースケール化→（ノイズ除去）→二値化
pub fn preprocess(image: &DynamicImage, options: &PreprocessOptions) -> GrayImage {
    let gray = image.to_luma8();
    let smoothed = if options.denoise {
        median_filter_3x3(&gray)
    } else {
        gray
    };
    binarize(&smoothed, options.threshold)
}

/// 3x3メディアンフィルタ（端は座標をクランプ）
pub fn median_filter_3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut output = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    let mut window = [0u8; 9];
    for y in 0..height {
        for x in 0..width {
            let mut i = 0;
            for dy in [-1i64, 0, 1] {
                for dx in [-1i64, 0, 1] {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    window[i] = image.get_pixel(sx, sy).0[0];
                    i += 1;
                }
            }
            window.sort_unstable();
            output.put_pixel(x, y, Luma([window[4]]));
        }
    }

    output
}

/// 二値化（閾値より大きければ255、それ以外は0）
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
    output
}
