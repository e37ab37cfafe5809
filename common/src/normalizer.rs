//! OCRテキストの正規化
//!
//! 照合前に生テキストを以下の形へ揃える:
//! 1. 小文字化
//! 2. 英数字・空白以外を空白に置換
//! 3. 連続空白を1つにまとめ、前後を除去

use regex::Regex;

lazy_static::lazy_static! {
    // 英数字（Unicode の Alphabetic / Numeric）と空白以外
    static ref NON_ALNUM_RE: Regex = Regex::new(r"[^\p{Alphabetic}\p{N}\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// 生テキストを照合用に正規化する
///
/// 失敗しない純粋関数。空文字列や記号のみの入力は空文字列になる。
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let lowered = raw.to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lowered, " ");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");

    collapsed.trim().to_string()
}

/// 正規化済みテキストを単語に分割
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|t| !t.is_empty())
}
