//! 証明書画像の取得

use crate::error::{CertPointsError, Result};
use std::time::Duration;
use tracing::debug;

const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// 画像取得
#[allow(async_fn_in_trait)]
pub trait ImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// URLを検証して解析する（http/https以外は拒否）
pub fn parse_image_url(url: &str) -> Result<reqwest::Url> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| CertPointsError::InvalidUrl(format!("{} ({})", url, e)))?;

    if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(CertPointsError::InvalidUrl(url.to_string()));
    }

    Ok(parsed)
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = parse_image_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| CertPointsError::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CertPointsError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CertPointsError::Fetch(format!("{}: {}", url, e)))?;
        debug!(url, size = bytes.len(), "画像取得完了");

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_parse_accepts_http_and_https() {
        assert!(parse_image_url("https://example.com/cert.png").is_ok());
        assert!(parse_image_url("http://example.com/cert.png").is_ok());
        assert!(parse_image_url("  https://example.com/a b.png ").is_ok());
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        for url in ["file:///etc/passwd", "ftp://example.com/a.png", "data:image/png;base64,AA"] {
            let err = parse_image_url(url).unwrap_err();
            assert!(matches!(err, CertPointsError::InvalidUrl(_)), "{}", url);
            assert_eq!(err.kind(), FailureKind::Fetch);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_image_url("").is_err());
        assert!(parse_image_url("certificates/1.png").is_err());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_fails_without_network() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Fetch);
    }
}
