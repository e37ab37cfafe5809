//! カテゴリ照合
//!
//! 正規化済みテキストに対して2種類のルールを同時に適用する。
//! - 複合ルール: アンカーと修飾語の両方が部分文字列として出現（重なり不可）
//! - カタログルール: 重み表の各キーが単語境界で出現
//!
//! どちらも正規表現を使わず部分文字列探索で判定する。

use crate::catalog::{Catalog, CompoundRule, Proximity};
use crate::normalizer::normalize;
use std::collections::BTreeSet;

/// 一致したカテゴリIDの集合
pub type MatchedSet = BTreeSet<String>;

/// 正規化済みテキストをカタログと照合する
pub fn match_categories(text: &str, catalog: &Catalog) -> MatchedSet {
    let mut matched = MatchedSet::new();
    if text.is_empty() {
        return matched;
    }

    for rule in &catalog.compound {
        if compound_matches(text, rule) {
            matched.insert(rule.category.clone());
        }
    }

    for key in catalog.points.keys() {
        let term = normalize(key);
        if contains_word(text, &term) {
            matched.insert(key.clone());
        }
    }

    matched
}

/// 複合ルールの判定
pub fn compound_matches(text: &str, rule: &CompoundRule) -> bool {
    let anchors = occurrences(text, &rule.anchor);
    if anchors.is_empty() {
        return false;
    }

    rule.qualifiers.iter().any(|qualifier| {
        let qualifiers = occurrences(text, qualifier);
        anchors.iter().any(|&(a_start, a_end)| {
            qualifiers.iter().any(|&(q_start, q_end)| {
                let disjoint = a_end <= q_start || q_end <= a_start;
                disjoint
                    && match rule.proximity {
                        Proximity::Anywhere => true,
                        Proximity::AnchorFirst => a_end <= q_start,
                        // 正規化済みテキストの区切りは空白1文字
                        Proximity::Adjacent => a_end == q_start || a_end + 1 == q_start,
                    }
            })
        })
    })
}

/// 単語境界で`term`が出現するか
pub fn contains_word(text: &str, term: &str) -> bool {
    !word_occurrences(text, term).is_empty()
}

/// 部分文字列としての出現位置（バイト範囲）をすべて返す
fn occurrences(text: &str, term: &str) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    if term.is_empty() || term.len() > text.len() {
        return found;
    }

    // 重なり合う出現も拾うため、1文字ずつずらして探索する
    let step = term.chars().next().map(char::len_utf8).unwrap_or(1);
    let mut from = 0;
    while let Some(offset) = text[from..].find(term) {
        let start = from + offset;
        found.push((start, start + term.len()));
        from = start + step;
        if from >= text.len() {
            break;
        }
    }

    found
}

/// 単語境界での出現位置
///
/// 正規化済みテキストでは単語境界＝文字列端または空白。
fn word_occurrences(text: &str, term: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    occurrences(text, term)
        .into_iter()
        .filter(|&(start, end)| {
            (start == 0 || bytes[start - 1] == b' ') && (end == bytes.len() || bytes[end] == b' ')
        })
        .collect()
}
