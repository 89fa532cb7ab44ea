//! 端末向けの結果表示

use crate::error::{InspectorError, Result};
use crate::health::HealthStatus;
use crate::upload::UploadedFile;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use car_inspector_common::format::{
    condition_icon, condition_text, confidence_percent, defect_icon, format_file_size,
};
use car_inspector_common::{AnalysisResult, Provenance};
use std::fmt::Write;

/// `car-inspector analyze` が出力する損傷レポート
pub fn render_report(upload: &UploadedFile, result: &AnalysisResult) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "📷 {} ({})",
        upload.file.name,
        format_file_size(upload.file.size())
    );
    let _ = writeln!(
        out,
        "{} Состояние: {}",
        condition_icon(result.overall_condition),
        condition_text(result.overall_condition)
    );
    let _ = writeln!(out, "Повреждений: {}", result.total_defect_count);

    for (defect_type, count) in result.defect_counts.iter() {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            defect_icon(defect_type),
            defect_type.label(),
            count
        );
    }

    if !result.detections.is_empty() {
        let _ = writeln!(out, "Обнаружения:");
        for (i, d) in result.detections.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} {}% [{:.0}, {:.0}, {:.0}, {:.0}]",
                i + 1,
                d.display_label,
                confidence_percent(d.confidence),
                d.bbox.x1,
                d.bbox.y1,
                d.bbox.x2,
                d.bbox.y2
            );
        }
        let _ = writeln!(
            out,
            "Средняя уверенность: {}%",
            confidence_percent(result.average_confidence)
        );
    }

    if result.provenance == Provenance::Fallback {
        let _ = writeln!(out, "⚠ Сервис недоступен: показан демонстрационный результат");
    }

    out
}

pub fn render_health(status: &HealthStatus) -> String {
    let mut out = String::new();
    let icon = if status.is_online { "🟢" } else { "🔴" };
    let _ = writeln!(out, "{} API: {}", icon, status.reported_state);
    if let Some(device) = &status.device {
        let _ = writeln!(out, "  device: {}", device);
    }
    if let Some(classes) = &status.supported_defect_classes {
        let _ = writeln!(out, "  classes: {}", classes.join(", "));
    }
    let _ = writeln!(
        out,
        "  checked: {}",
        status.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

/// オーバーレイ画像をデコード（素のbase64でも `data:` URLでも可）
pub fn decode_visualization(result: &AnalysisResult) -> Result<Option<Vec<u8>>> {
    let Some(encoded) = result.visualization.as_deref() else {
        return Ok(None);
    };

    let payload = match encoded.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    STANDARD
        .decode(payload.trim())
        .map(Some)
        .map_err(|e| InspectorError::ApiParse(format!("visualization is not valid base64: {}", e)))
}
