//! 検出サービスクライアント
//!
//! - `POST {base}/detect` (multipart): 解析
//! - `GET {base}/health`: 死活確認
//! - `GET {base}/model_info`: モデル情報（任意）
//!
//! `analyze` は失敗しない。通信・ステータス・本文の問題はログに残して
//! オフライン代替結果に置き換える

use super::fallback::{FallbackDelay, FallbackGenerator};
use crate::config::Config;
use crate::error::{InspectorError, Result};
use crate::health::HealthPayload;
use crate::upload::RawFile;
use car_inspector_common::{map_api_response, parse_detect_response, AnalysisResult};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

/// サービスに報告させる最低信頼度
pub const CONF_THRESHOLD: &str = "0.25";

#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    base_url: String,
    fallback: FallbackGenerator,
}

impl DetectionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url().to_string(),
            fallback: FallbackGenerator::new(FallbackDelay::from_config(config)),
        })
    }

    pub fn with_fallback_delay(mut self, delay: FallbackDelay) -> Self {
        self.fallback = FallbackGenerator::new(delay);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `file` を解析。失敗時は代替レポート
    pub async fn analyze(&self, file: &RawFile, source_image: &str) -> AnalysisResult {
        match self.detect(file, source_image).await {
            Ok(result) => {
                info!(
                    file = %file.name,
                    defects = result.total_defect_count,
                    "analysis completed by detection service"
                );
                result
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "detection service unavailable, using offline fallback");
                let result = self.fallback.generate(file, source_image).await;
                info!(
                    file = %file.name,
                    defects = result.total_defect_count,
                    "analysis completed by offline fallback"
                );
                result
            }
        }
    }

    /// リモート解析のみ。エラーは呼び出し側へ返す
    pub async fn detect(&self, file: &RawFile, source_image: &str) -> Result<AnalysisResult> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;
        let form = Form::new()
            .part("file", part)
            .text("conf_threshold", CONF_THRESHOLD)
            .text("include_visualization", "true");

        let url = format!("{}/detect", self.base_url);
        debug!(url = %url, size = file.size(), "sending detection request");

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InspectorError::ApiCall(format!("{} returned {}", url, status)));
        }

        let body = response.text().await?;
        let parsed = parse_detect_response(&body)?;

        if !parsed.is_self_consistent() {
            warn!(
                total_damages = parsed.total_damages,
                detections = parsed.detections.len(),
                "service counters disagree with detections, deriving from detections"
            );
        }

        Ok(map_api_response(parsed, source_image))
    }

    /// 死活確認：2xx応答ならオンライン
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }

    /// `/health` を取得する。2xxなら本文の形に関係なく成功
    pub async fn fetch_health(&self) -> Result<HealthPayload> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InspectorError::ApiCall(format!("{} returned {}", url, status)));
        }
        let body = response.text().await?;
        Ok(HealthPayload::from_body(&body))
    }

    /// モデル情報（取得できなければ `None`）
    pub async fn model_info(&self) -> Option<serde_json::Value> {
        let url = format!("{}/model_info", self.base_url);
        let response = match self.http.get(&url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(status = %r.status(), "model_info unavailable");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "model_info unavailable");
                return None;
            }
        };
        response.json().await.ok()
    }
}
