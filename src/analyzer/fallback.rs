//! オフライン代替
//!
//! 検出サービスに届かないときの代役。それらしい処理時間だけ待ってから
//! 仮のレポートを生成する

use crate::config::Config;
use crate::upload::RawFile;
use car_inspector_common::{generate_mock_result, AnalysisResult, ImageBounds};
use image::ImageReader;
use rand::Rng;
use std::io::Cursor;
use std::time::Duration;

/// 疑似処理時間の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackDelay {
    pub min: Duration,
    pub max: Duration,
}

impl FallbackDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_millis(config.fallback_delay_min_ms),
            Duration::from_millis(config.fallback_delay_max_ms),
        )
    }

    fn pick(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    delay: FallbackDelay,
}

impl FallbackGenerator {
    pub fn new(delay: FallbackDelay) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> FallbackDelay {
        self.delay
    }

    /// 疑似処理時間だけ待ってからレポートを生成
    pub async fn generate(&self, file: &RawFile, source_image: &str) -> AnalysisResult {
        let wait = self.delay.pick();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        self.synthesize(file, source_image)
    }

    /// 写真サイズ内に収まるボックスで仮レポートを作る
    pub fn synthesize(&self, file: &RawFile, source_image: &str) -> AnalysisResult {
        let bounds = probe_bounds(&file.bytes).unwrap_or_default();
        generate_mock_result(&mut rand::thread_rng(), bounds, source_image)
    }
}

/// ヘッダから読んだ画像サイズ（形式を判別できた場合のみ）
pub fn probe_bounds(bytes: &[u8]) -> Option<ImageBounds> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    Some(ImageBounds::new(width, height))
}
