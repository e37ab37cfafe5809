//! ポイント集計

use crate::matcher::MatchedSet;
use std::collections::BTreeMap;

/// 一致カテゴリのポイントを合計する
///
/// 重み表にないカテゴリは0点として扱う。上限は`u32::MAX`で飽和。
pub fn aggregate(matched: &MatchedSet, weights: &BTreeMap<String, u32>) -> u32 {
    matched
        .iter()
        .map(|category| weights.get(category).copied().unwrap_or(0))
        .fold(0u32, |total, points| total.saturating_add(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> BTreeMap<String, u32> {
        let mut w = BTreeMap::new();
        w.insert("nss".to_string(), 60);
        w.insert("hackathon".to_string(), 20);
        w.insert("nptel + 8 week".to_string(), 40);
        w
    }

    fn set(items: &[&str]) -> MatchedSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_set_scores_zero() {
        assert_eq!(aggregate(&MatchedSet::new(), &weights()), 0);
    }

    #[test]
    fn test_sum_of_weights() {
        let matched = set(&["nss", "hackathon", "nptel + 8 week"]);
        let expected: u32 = matched.iter().map(|c| weights().get(c).copied().unwrap_or(0)).sum();
        assert_eq!(aggregate(&matched, &weights()), expected);
        assert_eq!(expected, 120);
    }

    #[test]
    fn test_unknown_category_contributes_zero() {
        assert_eq!(aggregate(&set(&["hackathon", "unlisted"]), &weights()), 20);
        assert_eq!(aggregate(&set(&["unlisted"]), &BTreeMap::new()), 0);
    }

    #[test]
    fn test_saturates() {
        let mut w = BTreeMap::new();
        w.insert("a".to_string(), u32::MAX);
        w.insert("b".to_string(), 5);
        assert_eq!(aggregate(&set(&["a", "b"]), &w), u32::MAX);
    }
}
