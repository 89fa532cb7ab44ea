//! 表示用ヘルパー
//!
//! 信頼度は内部では常に0〜1。パーセントに変換するのはここだけ

use crate::types::{AnalysisResult, CarCondition, DefectType};
use crate::validator::MAX_FILE_SIZE;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 人が読めるサイズ表記: `0 Bytes`, `1.5 KB`, `10 MB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// [0, 1] の信頼度を四捨五入したパーセントに
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub fn defect_icon(defect_type: DefectType) -> &'static str {
    match defect_type {
        DefectType::Scratch => "🔍",
        DefectType::Dent => "🔨",
        DefectType::Rust => "🦠",
        DefectType::Crack => "💥",
    }
}

pub fn defect_color(defect_type: DefectType) -> &'static str {
    match defect_type {
        DefectType::Scratch => "#ff6b6b",
        DefectType::Dent => "#4ecdc4",
        DefectType::Rust => "#ffa726",
        DefectType::Crack => "#ab47bc",
    }
}

pub fn condition_text(condition: CarCondition) -> &'static str {
    match condition {
        CarCondition::Intact => "Целый",
        CarCondition::Damaged => "Поврежден",
    }
}

pub fn condition_icon(condition: CarCondition) -> &'static str {
    match condition {
        CarCondition::Intact => "✅",
        CarCondition::Damaged => "❌",
    }
}

/// 結果バナーのスタイルクラス
pub fn condition_class(condition: CarCondition) -> &'static str {
    match condition {
        CarCondition::Intact => "success",
        CarCondition::Damaged => "error",
    }
}

/// 損傷なし
pub fn is_positive_result(result: &AnalysisResult) -> bool {
    result.overall_condition == CarCondition::Intact && result.total_defect_count == 0
}

/// 対応形式のヒント
pub fn allowed_types_text() -> &'static str {
    "JPG, JPEG, PNG"
}

/// サイズ上限のヒント
pub fn max_file_size_text() -> String {
    format_file_size(MAX_FILE_SIZE)
}
