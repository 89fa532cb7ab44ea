//! 検出サービスの死活監視
//!
//! 最新の `HealthStatus` をwatchチャネルで保持する。購読者は何人でも
//! 登録でき、Receiverをdropすれば解除される。チェック失敗はエラーとして
//! 伝播せず、ステータスがofflineになるだけ

use crate::analyzer::DetectionClient;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// `/health` レスポンス本文
///
/// 各フィールドは任意。型が想定と違う値は無視してデフォルトに倒す
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthPayload {
    pub status: Option<String>,
    pub device: Option<String>,
    pub damage_classes: Option<Vec<String>>,
}

impl HealthPayload {
    /// JSON値から寛容に取り出す（配列でも `{"0": "scratch"}` 形式でも可）
    pub fn from_value(value: &Value) -> Self {
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let device = value
            .get("device")
            .and_then(Value::as_str)
            .map(str::to_string);
        let damage_classes = match value.get("damage_classes") {
            Some(Value::Array(items)) => Some(strings(items.iter())),
            Some(Value::Object(map)) => Some(strings(map.values())),
            _ => None,
        };

        Self {
            status,
            device,
            damage_classes,
        }
    }

    /// 本文がJSONでなければ全フィールド未設定
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str::<Value>(body)
            .map(|v| Self::from_value(&v))
            .unwrap_or_default()
    }
}

fn strings<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    values.filter_map(Value::as_str).map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub is_online: bool,
    pub reported_state: String,
    pub device: Option<String>,
    pub supported_defect_classes: Option<Vec<String>>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    /// 初回チェック完了前
    pub fn unknown() -> Self {
        Self::with_state(false, "unknown")
    }

    pub fn offline() -> Self {
        Self::with_state(false, "offline")
    }

    pub fn online(payload: HealthPayload) -> Self {
        Self {
            is_online: true,
            reported_state: payload.status.unwrap_or_else(|| "healthy".to_string()),
            device: payload.device,
            supported_defect_classes: payload.damage_classes,
            checked_at: Utc::now(),
        }
    }

    fn with_state(is_online: bool, state: &str) -> Self {
        Self {
            is_online,
            reported_state: state.to_string(),
            device: None,
            supported_defect_classes: None,
            checked_at: Utc::now(),
        }
    }
}

/// 1回分の死活確認
pub trait HealthProbe {
    fn probe(&self) -> impl Future<Output = Result<HealthPayload>> + Send;
}

impl HealthProbe for DetectionClient {
    async fn probe(&self) -> Result<HealthPayload> {
        self.fetch_health().await
    }
}

pub struct HealthMonitor<P> {
    probe: P,
    tx: watch::Sender<HealthStatus>,
}

impl<P: HealthProbe> HealthMonitor<P> {
    pub fn new(probe: P) -> Self {
        let (tx, _) = watch::channel(HealthStatus::unknown());
        Self { probe, tx }
    }

    /// 現在のスナップショット
    pub fn status(&self) -> HealthStatus {
        self.tx.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.tx.borrow().is_online
    }

    /// 購読を開始（Receiverのdropで解除）
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 1回チェックして結果を配信
    pub async fn refresh(&self) -> HealthStatus {
        let status = match self.probe.probe().await {
            Ok(payload) => HealthStatus::online(payload),
            Err(e) => {
                debug!(error = %e, "health check failed");
                HealthStatus::offline()
            }
        };

        let previous = self.tx.send_replace(status.clone());
        if previous.is_online != status.is_online {
            info!(
                online = status.is_online,
                state = %status.reported_state,
                "detection service status changed"
            );
        }
        status
    }
}

impl<P: HealthProbe + Send + Sync + 'static> HealthMonitor<P> {
    /// 一定間隔でチェックを繰り返す（即時開始、abortまで継続）
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                monitor.refresh().await;
            }
        })
    }
}
