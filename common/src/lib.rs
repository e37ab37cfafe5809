//! Certificate Points Common Library
//!
//! OCRテキストの正規化・カテゴリ照合・ポイント集計（I/Oなしの中核処理）

pub mod aggregator;
pub mod catalog;
pub mod error;
pub mod matcher;
pub mod normalizer;

pub use aggregator::aggregate;
pub use catalog::{Catalog, CompoundRule, Proximity};
pub use error::{Error, Result};
pub use matcher::{match_categories, MatchedSet};
pub use normalizer::normalize;

/// 採点結果
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Assessment {
    /// 正規化済みテキスト
    pub normalized_text: String,
    /// 一致カテゴリ
    pub matched: MatchedSet,
    /// 合計ポイント
    pub score: u32,
}

/// 生テキストを正規化→照合→集計する
pub fn assess(raw_text: &str, catalog: &Catalog) -> Assessment {
    let normalized_text = normalize(raw_text);
    let matched = match_categories(&normalized_text, catalog);
    let score = aggregate(&matched, &catalog.points);
    Assessment { normalized_text, matched, score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NCC_C_CERTIFICATE, NPTEL_12_WEEK, NPTEL_4_WEEK, NPTEL_8_WEEK};

    #[test]
    fn test_assess_ncc_c() {
        let catalog = Catalog::builtin();
        let result = assess("NCC 'C' Certificate issued", &catalog);
        assert!(result.matched.contains(NCC_C_CERTIFICATE));
        assert_eq!(result.score, catalog.points_for(NCC_C_CERTIFICATE));
    }

    #[test]
    fn test_assess_nptel_8_week() {
        let catalog = Catalog::builtin();
        let result = assess("Completed NPTEL course - 8 Week (online)", &catalog);
        assert!(result.matched.contains(NPTEL_8_WEEK));
        assert!(!result.matched.contains(NPTEL_4_WEEK));
        assert!(!result.matched.contains(NPTEL_12_WEEK));
        assert_eq!(result.score, catalog.points_for(NPTEL_8_WEEK));
    }

    #[test]
    fn test_assess_empty() {
        let result = assess("", &Catalog::builtin());
        assert!(result.matched.is_empty());
        assert_eq!(result.score, 0);
        assert_eq!(result.normalized_text, "");
    }
}
