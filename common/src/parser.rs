//! 検出APIレスポンスのパーサー
//!
//! `/detect` の本文をデシリアライズし、損傷レポートにできない形は弾く

use crate::error::{Error, Result};
use crate::types::{BoundingBox, CarCondition, DefectCounts, DefectType};
use serde::{Deserialize, Serialize};

/// サービスが返す検出1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDetection {
    pub class: DefectType,
    #[serde(default)]
    pub class_id: u32,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

/// `/detect` レスポンス本文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub image_path: Option<String>,
    pub car_condition: CarCondition,
    #[serde(default)]
    pub has_damages: bool,
    pub total_damages: u32,
    #[serde(default)]
    pub damage_stats: DefectCounts,
    pub detections: Vec<ApiDetection>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub conf_threshold: f64,
    #[serde(default)]
    pub visualization: Option<String>,
}

impl ApiResponse {
    /// サービス側の集計が検出リストと一致するか
    pub fn is_self_consistent(&self) -> bool {
        let derived = self.detections.iter().fold(DefectCounts::default(), |mut acc, d| {
            match d.class {
                DefectType::Scratch => acc.scratch += 1,
                DefectType::Dent => acc.dent += 1,
                DefectType::Rust => acc.rust += 1,
                DefectType::Crack => acc.crack += 1,
            }
            acc
        });

        derived == self.damage_stats
            && self.total_damages as usize == self.detections.len()
            && self.car_condition == CarCondition::from_defect_count(self.total_damages)
    }
}

/// `/detect` の本文を解析
///
/// # Errors
/// * `Error::Json` - 本文が想定の形でない
/// * `Error::InvalidResponse` - 信頼度が [0, 1] の範囲外
pub fn parse_detect_response(body: &str) -> Result<ApiResponse> {
    if body.trim().is_empty() {
        return Err(Error::Parse("empty response body".into()));
    }

    let response: ApiResponse = serde_json::from_str(body)?;

    for (i, d) in response.detections.iter().enumerate() {
        if !d.confidence.is_finite() || !(0.0..=1.0).contains(&d.confidence) {
            return Err(Error::InvalidResponse(format!(
                "detection #{} has confidence {} outside [0, 1]",
                i, d.confidence
            )));
        }
    }

    Ok(response)
}
