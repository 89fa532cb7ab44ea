//! セッション状態機械
//!
//! ユーザーセッションの `SessionState` を1つ保持し、アップロード・解析・表示・
//! リセットを順に進める。遷移のたびに新しい状態を作って配信するので、
//! 購読者が見るのは常に完全なスナップショット。
//!
//! 解析は `start_analysis` と `complete_analysis` に分かれている。
//! 保留中でなくなったチケットの完了は捨てる

use crate::analyzer::Analyzer;
use crate::error::{InspectorError, Result, ANALYSIS_FAILED_MESSAGE};
use crate::upload::{RawFile, UploadPipeline, UploadedFile};
use car_inspector_common::AnalysisResult;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub uploaded_file: Option<Arc<UploadedFile>>,
    pub is_analyzing: bool,
    pub result: Option<Arc<AnalysisResult>>,
    pub error: Option<String>,
}

/// 状態フィールドの組み合わせに付けた名前
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Previewing,
    Analyzing,
    Completed,
    Failed,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.error.is_some() {
            SessionPhase::Failed
        } else if self.uploaded_file.is_none() {
            SessionPhase::Empty
        } else if self.is_analyzing {
            SessionPhase::Analyzing
        } else if self.result.is_some() {
            SessionPhase::Completed
        } else {
            SessionPhase::Previewing
        }
    }
}

/// 解析開始の証。結果と一緒に返す
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    seq: u64,
    upload: Arc<UploadedFile>,
}

impl AnalysisTicket {
    pub fn upload(&self) -> &UploadedFile {
        &self.upload
    }
}

pub struct SessionController {
    uploads: UploadPipeline,
    tx: watch::Sender<Arc<SessionState>>,
    next_seq: u64,
    pending: Option<u64>,
}

impl SessionController {
    pub fn new(uploads: UploadPipeline) -> Self {
        let (tx, _) = watch::channel(Arc::new(SessionState::default()));
        Self {
            uploads,
            tx,
            next_seq: 0,
            pending: None,
        }
    }

    /// 現在のスナップショット
    pub fn state(&self) -> Arc<SessionState> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.tx.subscribe()
    }

    pub fn has_uploaded_file(&self) -> bool {
        self.tx.borrow().uploaded_file.is_some()
    }

    pub fn can_start_analysis(&self) -> bool {
        let state = self.tx.borrow();
        state.uploaded_file.is_some() && !state.is_analyzing
    }

    /// 新しい写真を検証して受け付ける（前の写真は置き換え）
    ///
    /// 却下された場合はメッセージを `error` に入れ、前の写真はそのまま
    pub fn submit_file(&mut self, file: RawFile) -> Result<()> {
        match self.uploads.process(file) {
            Ok(uploaded) => {
                self.release_current();
                self.pending = None;
                self.publish(SessionState {
                    uploaded_file: Some(Arc::new(uploaded)),
                    ..SessionState::default()
                });
                Ok(())
            }
            Err(e) => {
                let current = self.state();
                self.pending = None;
                self.publish(SessionState {
                    uploaded_file: current.uploaded_file.clone(),
                    is_analyzing: false,
                    result: None,
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }

    /// Analyzingへ遷移。写真がない・解析中なら `None` で何も変えない
    pub fn start_analysis(&mut self) -> Option<AnalysisTicket> {
        let current = self.state();
        if current.is_analyzing {
            debug!("analysis already in progress, ignoring start");
            return None;
        }
        let upload = current.uploaded_file.clone()?;

        self.next_seq += 1;
        self.pending = Some(self.next_seq);
        info!(file = %upload.file.name, preview = %upload.preview, "analysis started");

        self.publish(SessionState {
            uploaded_file: Some(Arc::clone(&upload)),
            is_analyzing: true,
            result: None,
            error: None,
        });

        Some(AnalysisTicket {
            seq: self.next_seq,
            upload,
        })
    }

    /// 開始済み解析の結果を反映
    ///
    /// その間に写真が削除・差し替えされていたら `false` を返して結果を捨てる
    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<AnalysisResult>,
    ) -> bool {
        if self.pending != Some(ticket.seq) {
            debug!(preview = %ticket.upload.preview, "stale analysis result discarded");
            return false;
        }
        self.pending = None;

        let state = match outcome {
            Ok(result) => {
                info!(
                    defects = result.total_defect_count,
                    provenance = ?result.provenance,
                    "analysis result stored"
                );
                SessionState {
                    uploaded_file: Some(ticket.upload),
                    is_analyzing: false,
                    result: Some(Arc::new(result)),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = ?e, "analysis failed");
                SessionState {
                    uploaded_file: Some(ticket.upload),
                    is_analyzing: false,
                    result: None,
                    error: Some(InspectorError::Analysis(e.to_string()).to_string()),
                }
            }
        };
        self.publish(state);
        true
    }

    /// 解析を開始して完了まで待つ（`start_analysis` と同じ条件で何もしない）
    pub async fn run_analysis<A: Analyzer>(&mut self, analyzer: &A) -> bool {
        let Some(ticket) = self.start_analysis() else {
            return false;
        };
        let outcome = analyzer.analyze_upload(ticket.upload()).await;
        self.complete_analysis(ticket, outcome)
    }

    /// 写真とそこから派生したものをすべて破棄
    pub fn remove_photo(&mut self) {
        self.release_current();
        self.pending = None;
        self.publish(SessionState::default());
    }

    pub fn replace_photo(&mut self) {
        self.remove_photo();
    }

    pub fn reset(&mut self) {
        self.remove_photo();
    }

    pub fn clear_error(&mut self) {
        let current = self.state();
        if current.error.is_none() {
            return;
        }
        self.publish(SessionState {
            error: None,
            ..(*current).clone()
        });
    }

    fn release_current(&self) {
        if let Some(upload) = &self.tx.borrow().uploaded_file {
            self.uploads.release(upload);
        }
    }

    fn publish(&self, state: SessionState) {
        debug!(phase = ?state.phase(), "session transition");
        self.tx.send_replace(Arc::new(state));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.release_current();
    }
}
