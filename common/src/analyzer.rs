//! 検出サービスの出力を損傷レポートへ変換

use crate::parser::ApiResponse;
use crate::types::{AnalysisResult, Detection, Provenance};

/// 検出信頼度の算術平均（検出なしなら0）
pub fn average_confidence(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    detections.iter().map(|d| d.confidence).sum::<f64>() / detections.len() as f64
}

/// `/detect` レスポンスを `AnalysisResult` に変換
///
/// 検出リストを正とし、種別件数・合計・全体判定はそこから導出する。
/// サービス側の集計が食い違っていてもレポートは矛盾しない
pub fn map_api_response(response: ApiResponse, source_image: &str) -> AnalysisResult {
    let detections = response
        .detections
        .into_iter()
        .map(|d| Detection::new(d.class, d.confidence, d.bbox))
        .collect();

    AnalysisResult::from_detections(
        detections,
        source_image,
        response.visualization,
        Provenance::Remote,
    )
}
