//! カテゴリカタログ
//!
//! 活動カテゴリ → ポイントの重み表と、複合ルール（アンカー＋修飾語）の定義。
//! 起動時に一度だけ読み込み、以降は読み取り専用で共有する。

use crate::error::{Error, Result};
use crate::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// NCC C証明書
pub const NCC_C_CERTIFICATE: &str = "ncc_c-certificate";
/// NPTEL 4週間コース
pub const NPTEL_4_WEEK: &str = "nptel + 4 week";
/// NPTEL 8週間コース
pub const NPTEL_8_WEEK: &str = "nptel + 8 week";
/// NPTEL 12週間コース
pub const NPTEL_12_WEEK: &str = "nptel + 12 week";

/// 複合ルールのアンカーと修飾語の位置関係
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    /// 順序・距離を問わず両方が含まれていればよい
    #[default]
    Anywhere,
    /// アンカーの後ろのどこかに修飾語がある
    AnchorFirst,
    /// アンカーの直後に修飾語が続く
    Adjacent,
}

/// 複合ルール（例: "nptel" ＋ "8 week"）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundRule {
    /// 一致時に追加するカテゴリID
    pub category: String,
    /// アンカー語（機関・プログラム名）
    pub anchor: String,
    /// 修飾語の候補（いずれか1つが一致すればよい。OCR揺れ対策）
    pub qualifiers: Vec<String>,
    #[serde(default)]
    pub proximity: Proximity,
}

impl CompoundRule {
    pub fn new(category: &str, anchor: &str, qualifiers: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            anchor: normalize(anchor),
            qualifiers: qualifiers.iter().map(|q| normalize(q)).collect(),
            proximity: Proximity::Anywhere,
        }
    }

    pub fn with_proximity(mut self, proximity: Proximity) -> Self {
        self.proximity = proximity;
        self
    }
}

/// カタログ本体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// カテゴリID → ポイント（カタログルールのキーも兼ねる）
    #[serde(default)]
    pub points: BTreeMap<String, u32>,
    /// 複合ルール
    #[serde(default)]
    pub compound: Vec<CompoundRule>,
}

impl Catalog {
    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validated()
    }

    /// 複合ルールの語を正規化し、空のルールを弾く
    fn validated(mut self) -> Result<Self> {
        for rule in &mut self.compound {
            rule.anchor = normalize(&rule.anchor);
            if rule.anchor.is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "アンカーが空です: {}",
                    rule.category
                )));
            }

            rule.qualifiers = rule
                .qualifiers
                .iter()
                .map(|q| normalize(q))
                .filter(|q| !q.is_empty())
                .collect();
            if rule.qualifiers.is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "修飾語がありません: {}",
                    rule.category
                )));
            }
        }
        Ok(self)
    }

    /// カテゴリのポイント（未登録は0）
    pub fn points_for(&self, category: &str) -> u32 {
        self.points.get(category).copied().unwrap_or(0)
    }

    /// カテゴリ数
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.compound.is_empty()
    }

    /// 組み込みの既定カタログ
    pub fn builtin() -> Self {
        let mut points = BTreeMap::new();

        // 複合ルールのカテゴリ
        points.insert(NCC_C_CERTIFICATE.into(), 80);
        points.insert(NPTEL_4_WEEK.into(), 20);
        points.insert(NPTEL_8_WEEK.into(), 40);
        points.insert(NPTEL_12_WEEK.into(), 50);

        // 国家奉仕・スポーツ
        points.insert("nss".into(), 60);
        points.insert("national service scheme".into(), 60);
        points.insert("state level".into(), 40);
        points.insert("national level".into(), 60);
        points.insert("sports".into(), 20);
        points.insert("arts".into(), 20);

        // 技術系活動
        points.insert("hackathon".into(), 20);
        points.insert("internship".into(), 20);
        points.insert("industrial visit".into(), 10);
        points.insert("workshop".into(), 15);
        points.insert("seminar".into(), 10);
        points.insert("paper presentation".into(), 20);
        points.insert("conference".into(), 15);
        points.insert("mooc".into(), 50);
        points.insert("coursera".into(), 20);
        points.insert("udemy".into(), 10);

        // 起業・研究
        points.insert("startup".into(), 60);
        points.insert("patent".into(), 60);
        points.insert("innovation".into(), 20);

        let compound = vec![
            CompoundRule::new(
                NCC_C_CERTIFICATE,
                "ncc",
                &["c certificate", "c certlficate", "c cert1ficate", "c cert ficate", "ccertificate"],
            ),
            CompoundRule::new(NPTEL_4_WEEK, "nptel", &["4 week", "4 weeks", "4week", "4weeks"]),
            CompoundRule::new(NPTEL_8_WEEK, "nptel", &["8 week", "8 weeks", "8week", "8weeks"]),
            CompoundRule::new(NPTEL_12_WEEK, "nptel", &["12 week", "12 weeks", "12week", "12weeks"]),
        ];

        Self { points, compound }
    }
}
