//! アップロード処理
//!
//! 検証 → プレビューハンドル取得。失敗したらそこで終わり、再送は呼び出し側

mod preview;

pub use preview::{MemoryPreviewStore, PreviewHandle, PreviewStore};

use crate::error::{InspectorError, Result};
use car_inspector_common::{validate_file, ValidationOutcome};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// フロントエンドから渡されるユーザー選択ファイル
#[derive(Clone)]
pub struct RawFile {
    pub name: String,
    /// 申告されたメディアタイプ（例: `image/jpeg`）
    pub media_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// ディスクから読み込み、拡張子からメディアタイプを決める
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let media_type = media_type_for(&name);
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn validate(&self) -> ValidationOutcome {
        validate_file(&self.name, self.size(), &self.media_type)
    }
}

impl fmt::Debug for RawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// ブラウザがこのファイル名に付けるメディアタイプ
pub fn media_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// 検証済みファイルと有効なプレビューハンドル
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file: RawFile,
    pub preview: PreviewHandle,
    pub uploaded_at: DateTime<Utc>,
}

pub struct UploadPipeline {
    store: Arc<dyn PreviewStore>,
}

impl UploadPipeline {
    pub fn new(store: Arc<dyn PreviewStore>) -> Self {
        Self { store }
    }

    /// `file` を検証してプレビューハンドルを取得
    ///
    /// # Errors
    /// * `InspectorError::Validation` - 違反したルールごとのメッセージ
    /// * `InspectorError::Upload` - プレビューハンドルを作れなかった
    pub fn process(&self, file: RawFile) -> Result<UploadedFile> {
        let outcome = file.validate();
        if !outcome.is_valid {
            info!(file = %file.name, errors = ?outcome.errors, "upload rejected");
            return Err(InspectorError::Validation(outcome.errors));
        }

        let preview = self.store.create(&file).map_err(|e| {
            warn!(file = %file.name, error = %e, "preview creation failed");
            InspectorError::Upload
        })?;

        info!(file = %file.name, size = file.size(), preview = %preview, "upload accepted");
        Ok(UploadedFile {
            file,
            preview,
            uploaded_at: Utc::now(),
        })
    }

    /// 破棄したアップロードのプレビューハンドルを解放
    pub fn release(&self, uploaded: &UploadedFile) {
        self.store.release(&uploaded.preview);
    }
}
