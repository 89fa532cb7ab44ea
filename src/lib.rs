//! 車両写真の損傷検査クライアント
//!
//! ユーザーが選んだ写真を検証し、リモートの検出サービスに送って損傷レポートを作る。
//! サービスに届かない場合はローカルで生成した仮の結果を返す

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod report;
pub mod session;
pub mod upload;

pub use analyzer::{Analyzer, DetectionClient};
pub use config::Config;
pub use error::{InspectorError, Result};
pub use health::{HealthMonitor, HealthStatus};
pub use session::{SessionController, SessionPhase, SessionState};
pub use upload::{MemoryPreviewStore, RawFile, UploadPipeline, UploadedFile};
