//! プレビューハンドル
//!
//! フロントエンドが選択写真を表示するための取り消し可能な参照。
//! 自動では解放されないので、`UploadedFile` を破棄する側が
//! `PreviewStore::release` を呼ぶこと

use super::RawFile;
use crate::error::{InspectorError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// プレビューハンドルの生成・破棄（プラットフォーム依存部分）
pub trait PreviewStore: Send + Sync {
    fn create(&self, file: &RawFile) -> Result<PreviewHandle>;
    fn release(&self, handle: &PreviewHandle);
}

/// `preview://<n>` を払い出すプロセス内ストア
#[derive(Default)]
pub struct MemoryPreviewStore {
    next_id: AtomicU64,
    live: Mutex<HashMap<PreviewHandle, Arc<Vec<u8>>>>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有効なハンドルの中身
    pub fn get(&self, handle: &PreviewHandle) -> Option<Arc<Vec<u8>>> {
        self.entries().get(handle).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PreviewHandle, Arc<Vec<u8>>>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&self, file: &RawFile) -> Result<PreviewHandle> {
        // 表示するものがない
        if file.bytes.is_empty() {
            return Err(InspectorError::Upload);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = PreviewHandle::new(format!("preview://{}", id));
        self.entries().insert(handle.clone(), Arc::clone(&file.bytes));
        debug!(handle = %handle, file = %file.name, "preview created");
        Ok(handle)
    }

    fn release(&self, handle: &PreviewHandle) {
        if self.entries().remove(handle).is_some() {
            debug!(handle = %handle, "preview released");
        } else {
            warn!(handle = %handle, "release of unknown preview handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_release() {
        let store = MemoryPreviewStore::new();
        let file = RawFile::new("car.jpg", "image/jpeg", vec![1, 2, 3]);

        let handle = store.create(&file).unwrap();
        assert!(handle.as_str().starts_with("preview://"));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.get(&handle).unwrap().as_slice(), &[1, 2, 3]);

        store.release(&handle);
        assert_eq!(store.live_count(), 0);
        assert!(store.get(&handle).is_none());
    }

    #[test]
    fn test_handles_are_unique() {
        let store = MemoryPreviewStore::new();
        let file = RawFile::new("car.jpg", "image/jpeg", vec![1]);

        let a = store.create(&file).unwrap();
        let b = store.create(&file).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn test_empty_file_has_no_preview() {
        let store = MemoryPreviewStore::new();
        let file = RawFile::new("car.jpg", "image/jpeg", Vec::new());
        assert!(matches!(store.create(&file), Err(InspectorError::Upload)));
    }

    #[test]
    fn test_double_release_is_harmless() {
        let store = MemoryPreviewStore::new();
        let file = RawFile::new("car.png", "image/png", vec![9]);
        let handle = store.create(&file).unwrap();

        store.release(&handle);
        store.release(&handle);
        assert_eq!(store.live_count(), 0);
    }
}
