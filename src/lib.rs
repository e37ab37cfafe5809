pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod ocr;
pub mod pipeline;
pub mod record;
pub mod scanner;

use cert_points_common::Catalog;
use config::Config;
use error::Result;
use std::path::Path;
use tracing::info;

/// カタログを読み込む（CLI指定 > 設定ファイル > 組み込み）
pub fn load_catalog(override_path: Option<&Path>, config: &Config) -> Result<Catalog> {
    let path = override_path.or(config.catalog_path.as_deref());
    match path {
        Some(p) => {
            let catalog = Catalog::from_file(p)?;
            info!(path = %p.display(), categories = catalog.len(), "カタログ読み込み");
            Ok(catalog)
        }
        None => Ok(Catalog::builtin()),
    }
}
