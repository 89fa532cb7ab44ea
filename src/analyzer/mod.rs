mod client;
mod fallback;

pub use client::{DetectionClient, CONF_THRESHOLD};
pub use fallback::{probe_bounds, FallbackDelay, FallbackGenerator};
pub use car_inspector_common::AnalysisResult;

use crate::error::Result;
use crate::upload::UploadedFile;
use std::future::Future;

/// 受理済みアップロードの損傷レポートを作る
///
/// セッションは `Err` を解析失敗として扱う。`DetectionClient` は代替レポートに
/// 切り替えるので `Err` を返さない
pub trait Analyzer {
    fn analyze_upload(&self, upload: &UploadedFile) -> impl Future<Output = Result<AnalysisResult>> + Send;
}

impl Analyzer for DetectionClient {
    async fn analyze_upload(&self, upload: &UploadedFile) -> Result<AnalysisResult> {
        Ok(self.analyze(&upload.file, upload.preview.as_str()).await)
    }
}
