//! オフライン用の仮結果
//!
//! 検出サービスに届かないときに使う。統計的にはそれらしいが、
//! 実際の写真の内容とは無関係

use crate::types::{AnalysisResult, BoundingBox, DefectType, Detection, Provenance};
use rand::Rng;

/// 損傷ありになる確率
pub const MOCK_DAMAGE_PROBABILITY: f64 = 0.5;
/// 生成する検出数の上限
pub const MOCK_MAX_DETECTIONS: u32 = 3;
pub const MOCK_MIN_CONFIDENCE: f64 = 0.70;
pub const MOCK_MAX_CONFIDENCE: f64 = 1.00;

/// 生成ボックスを画像内に収めるためのピクセルサイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for ImageBounds {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// 代替レポートを生成
pub fn generate_mock_result<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: ImageBounds,
    source_image: &str,
) -> AnalysisResult {
    let count = if rng.gen_bool(MOCK_DAMAGE_PROBABILITY) {
        rng.gen_range(1..=MOCK_MAX_DETECTIONS)
    } else {
        0
    };

    let mut detections = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let defect_type = DefectType::ALL[rng.gen_range(0..DefectType::ALL.len())];
        let confidence = rng.gen_range(MOCK_MIN_CONFIDENCE..=MOCK_MAX_CONFIDENCE);
        let bbox = random_bbox(rng, bounds);
        detections.push(Detection::new(defect_type, confidence, bbox));
    }

    AnalysisResult::from_detections(detections, source_image, None, Provenance::Fallback)
}

fn random_bbox<R: Rng + ?Sized>(rng: &mut R, bounds: ImageBounds) -> BoundingBox {
    // `new` を経由しない 0 も 1 に丸める
    let (width, height) = (bounds.width.max(1), bounds.height.max(1));
    let w = random_side(rng, width);
    let h = random_side(rng, height);
    let x1 = rng.gen_range(0..=width - w);
    let y1 = rng.gen_range(0..=height - h);

    BoundingBox {
        x1: x1 as f64,
        y1: y1 as f64,
        x2: (x1 + w) as f64,
        y2: (y1 + h) as f64,
        width: w as f64,
        height: h as f64,
    }
}

/// 辺の1/10〜1/3
fn random_side<R: Rng + ?Sized>(rng: &mut R, full: u32) -> u32 {
    let min = (full / 10).max(1);
    let max = (full / 3).max(min);
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CarCondition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_mock_invariants_hold() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let result = generate_mock_result(&mut rng, ImageBounds::default(), "preview://1");
            assert!(result.is_consistent());
            assert!(result.total_defect_count <= MOCK_MAX_DETECTIONS);
            assert_eq!(
                result.overall_condition == CarCondition::Damaged,
                result.total_defect_count > 0
            );
            assert_eq!(result.provenance, Provenance::Fallback);
            assert!(result.visualization.is_none());
        }
    }

    #[test]
    fn test_mock_confidence_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let result = generate_mock_result(&mut rng, ImageBounds::default(), "preview://1");
            for d in &result.detections {
                assert!(d.confidence >= MOCK_MIN_CONFIDENCE && d.confidence <= MOCK_MAX_CONFIDENCE);
            }
        }
    }

    #[test]
    fn test_mock_boxes_inside_bounds() {
        let bounds = ImageBounds::new(320, 200);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let result = generate_mock_result(&mut rng, bounds, "preview://1");
            for d in &result.detections {
                let b = d.bbox;
                assert!(b.x1 >= 0.0 && b.y1 >= 0.0);
                assert!(b.x2 <= 320.0 && b.y2 <= 200.0);
                assert_eq!(b.x2 - b.x1, b.width);
                assert_eq!(b.y2 - b.y1, b.height);
                assert!(b.width >= 1.0 && b.height >= 1.0);
            }
        }
    }

    #[test]
    fn test_mock_tiny_image() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let result = generate_mock_result(&mut rng, ImageBounds::new(0, 1), "preview://1");
            for d in &result.detections {
                assert_eq!(d.bbox.x2, 1.0);
                assert_eq!(d.bbox.y2, 1.0);
            }
        }
    }

    /// `new` を通さないゼロサイズでもパニックしない
    #[test]
    fn test_mock_zero_sized_literal_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = ImageBounds { width: 0, height: 0 };
        for _ in 0..200 {
            let result = generate_mock_result(&mut rng, bounds, "preview://1");
            assert!(result.is_consistent());
            for d in &result.detections {
                assert_eq!((d.bbox.x1, d.bbox.y1), (0.0, 0.0));
                assert_eq!((d.bbox.x2, d.bbox.y2), (1.0, 1.0));
            }
        }
    }

    #[test]
    fn test_mock_is_not_degenerate() {
        let mut rng = rand::thread_rng();
        let mut damaged = 0;
        let mut intact = 0;
        let mut types = HashSet::new();

        for _ in 0..1000 {
            let result = generate_mock_result(&mut rng, ImageBounds::default(), "preview://1");
            match result.overall_condition {
                CarCondition::Damaged => damaged += 1,
                CarCondition::Intact => intact += 1,
            }
            types.extend(result.detections.iter().map(|d| d.defect_type));
        }

        assert!(damaged > 0);
        assert!(intact > 0);
        assert!(types.len() >= 2);
    }
}
