//! ローカルJSONファイルのレコードソース
//!
//! ファイルは `CertificateRecord` の配列。書き込みのたびに同じフォルダの
//! 一時ファイルへ全体を書き出し、置き換える。

use super::{CertificateRecord, RecordSource};
use crate::error::{CertPointsError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全レコードを読み込む
    pub fn load_all(&self) -> Result<Vec<CertificateRecord>> {
        if !self.path.exists() {
            return Err(CertPointsError::RecordSource(format!(
                "レコードファイルが見つかりません: {}",
                self.path.display()
            )));
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let records = serde_json::from_reader(reader)?;
        Ok(records)
    }

    fn save_all(&self, records: &[CertificateRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl RecordSource for JsonFileSource {
    async fn list_unprocessed(&self) -> Result<Vec<CertificateRecord>> {
        Ok(self.load_all()?.into_iter().filter(|r| !r.processed).collect())
    }

    async fn report_result(&self, id: &str, processed: bool, score: u32) -> Result<()> {
        let mut records = self.load_all().map_err(|e| CertPointsError::Report(e.to_string()))?;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CertPointsError::Report(format!("更新対象のレコードがありません: id={}", id)))?;
        record.processed = processed;
        record.score = score;

        self.save_all(&records).map_err(|e| CertPointsError::Report(e.to_string()))
    }
}
