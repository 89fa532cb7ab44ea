//! 損傷レポートの型定義
//!
//! CLIと他のフロントエンドで共有:
//! - DefectType / Detection: 写真内の1つの損傷
//! - DefectCounts: 種別ごとの件数（4種類すべて常に存在）
//! - AnalysisResult: ユーザーに表示するレポート全体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 検出モデルが扱う損傷クラス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefectType {
    Scratch,
    Dent,
    Rust,
    Crack,
}

impl DefectType {
    pub const ALL: [DefectType; 4] = [
        DefectType::Scratch,
        DefectType::Dent,
        DefectType::Rust,
        DefectType::Crack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectType::Scratch => "scratch",
            DefectType::Dent => "dent",
            DefectType::Rust => "rust",
            DefectType::Crack => "crack",
        }
    }

    /// 検出結果の横に表示するラベル
    pub fn label(&self) -> &'static str {
        match self {
            DefectType::Scratch => "Царапина",
            DefectType::Dent => "Вмятина",
            DefectType::Rust => "Ржавчина",
            DefectType::Crack => "Трещина",
        }
    }
}

/// 車両全体の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarCondition {
    Intact,
    Damaged,
}

impl CarCondition {
    pub fn from_defect_count(count: u32) -> Self {
        if count > 0 {
            CarCondition::Damaged
        } else {
            CarCondition::Intact
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CarCondition::Intact => "intact",
            CarCondition::Damaged => "damaged",
        }
    }
}

/// 結果の出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// リモート検出サービス
    Remote,
    /// ローカル生成の仮結果
    Fallback,
}

/// 元画像のピクセル座標でのバウンディングボックス
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
}

/// 検出された損傷1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub defect_type: DefectType,
    /// [0, 1] の割合
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub display_label: String,
}

impl Detection {
    pub fn new(defect_type: DefectType, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            defect_type,
            confidence,
            bbox,
            display_label: defect_type.label().to_string(),
        }
    }
}

/// 種別ごとの損傷件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefectCounts {
    pub scratch: u32,
    pub dent: u32,
    pub rust: u32,
    pub crack: u32,
}

impl DefectCounts {
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut counts = Self::default();
        for d in detections {
            *counts.slot_mut(d.defect_type) += 1;
        }
        counts
    }

    pub fn get(&self, defect_type: DefectType) -> u32 {
        match defect_type {
            DefectType::Scratch => self.scratch,
            DefectType::Dent => self.dent,
            DefectType::Rust => self.rust,
            DefectType::Crack => self.crack,
        }
    }

    fn slot_mut(&mut self, defect_type: DefectType) -> &mut u32 {
        match defect_type {
            DefectType::Scratch => &mut self.scratch,
            DefectType::Dent => &mut self.dent,
            DefectType::Rust => &mut self.rust,
            DefectType::Crack => &mut self.crack,
        }
    }

    pub fn total(&self) -> u32 {
        self.scratch + self.dent + self.rust + self.crack
    }

    /// 固定の表示順で (種別, 件数)
    pub fn iter(&self) -> impl Iterator<Item = (DefectType, u32)> + '_ {
        DefectType::ALL.into_iter().map(move |t| (t, self.get(t)))
    }
}

/// 写真1枚分の損傷レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_condition: CarCondition,
    pub total_defect_count: u32,
    pub defect_counts: DefectCounts,
    /// 取得元が返した順
    pub detections: Vec<Detection>,
    pub analyzed_at: DateTime<Utc>,
    /// 解析した画像のプレビューハンドル
    pub source_image: String,
    /// サービスが描画したBase64オーバーレイ画像
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<String>,
    pub average_confidence: f64,
    pub provenance: Provenance,
}

impl AnalysisResult {
    /// 件数・判定・平均をすべて `detections` から導出してレポートを作る
    pub fn from_detections(
        detections: Vec<Detection>,
        source_image: impl Into<String>,
        visualization: Option<String>,
        provenance: Provenance,
    ) -> Self {
        let defect_counts = DefectCounts::from_detections(&detections);
        let total_defect_count = defect_counts.total();

        Self {
            overall_condition: CarCondition::from_defect_count(total_defect_count),
            total_defect_count,
            defect_counts,
            average_confidence: crate::analyzer::average_confidence(&detections),
            detections,
            analyzed_at: Utc::now(),
            source_image: source_image.into(),
            visualization,
            provenance,
        }
    }

    /// 件数・検出・判定が互いに矛盾しないか
    pub fn is_consistent(&self) -> bool {
        self.total_defect_count == self.defect_counts.total()
            && self.total_defect_count as usize == self.detections.len()
            && self.overall_condition == CarCondition::from_defect_count(self.total_defect_count)
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(defect_type: DefectType, confidence: f64) -> Detection {
        Detection::new(defect_type, confidence, BoundingBox::default())
    }

    #[test]
    fn test_defect_type_serde_lowercase() {
        let json = serde_json::to_string(&DefectType::Scratch).unwrap();
        assert_eq!(json, "\"scratch\"");

        let parsed: DefectType = serde_json::from_str("\"crack\"").unwrap();
        assert_eq!(parsed, DefectType::Crack);
    }

    #[test]
    fn test_unknown_defect_type_rejected() {
        assert!(serde_json::from_str::<DefectType>("\"dirt\"").is_err());
    }

    #[test]
    fn test_detection_label_follows_type() {
        assert_eq!(detection(DefectType::Scratch, 0.9).display_label, "Царапина");
        assert_eq!(detection(DefectType::Dent, 0.9).display_label, "Вмятина");
        assert_eq!(detection(DefectType::Rust, 0.9).display_label, "Ржавчина");
        assert_eq!(detection(DefectType::Crack, 0.9).display_label, "Трещина");
    }

    #[test]
    fn test_defect_counts_zero_filled() {
        let counts: DefectCounts = serde_json::from_str(r#"{"scratch": 2}"#).unwrap();
        assert_eq!(counts.scratch, 2);
        assert_eq!(counts.get(DefectType::Rust), 0);
        assert_eq!(counts.iter().count(), 4);
    }

    #[test]
    fn test_from_detections_intact() {
        let result = AnalysisResult::from_detections(vec![], "preview://1", None, Provenance::Remote);
        assert_eq!(result.overall_condition, CarCondition::Intact);
        assert_eq!(result.total_defect_count, 0);
        assert_eq!(result.average_confidence, 0.0);
        assert!(result.is_consistent());
    }

    #[test]
    fn test_from_detections_damaged() {
        let result = AnalysisResult::from_detections(
            vec![
                detection(DefectType::Rust, 0.9),
                detection(DefectType::Rust, 0.7),
                detection(DefectType::Dent, 0.8),
            ],
            "preview://1",
            None,
            Provenance::Fallback,
        );

        assert_eq!(result.overall_condition, CarCondition::Damaged);
        assert_eq!(result.total_defect_count, 3);
        assert_eq!(result.defect_counts.rust, 2);
        assert_eq!(result.defect_counts.dent, 1);
        assert_eq!(result.defect_counts.scratch, 0);
        assert!((result.average_confidence - 0.8).abs() < 1e-9);
        assert!(result.is_consistent());
        assert!(result.is_fallback());
    }

    #[test]
    fn test_inconsistent_result_detected() {
        let mut result = AnalysisResult::from_detections(
            vec![detection(DefectType::Crack, 0.75)],
            "preview://1",
            None,
            Provenance::Remote,
        );
        result.overall_condition = CarCondition::Intact;
        assert!(!result.is_consistent());
    }

    #[test]
    fn test_analysis_result_serialize_camel_case() {
        let result = AnalysisResult::from_detections(
            vec![detection(DefectType::Scratch, 0.8)],
            "preview://7",
            None,
            Provenance::Remote,
        );

        let json = serde_json::to_string(&result).expect("serialize failed");
        assert!(json.contains("\"overallCondition\":\"damaged\""));
        assert!(json.contains("\"totalDefectCount\":1"));
        assert!(json.contains("\"defectType\":\"scratch\""));
        assert!(json.contains("\"provenance\":\"remote\""));
        assert!(!json.contains("visualization"));
    }
}
