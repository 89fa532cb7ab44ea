//! アップロード検証ルール
//!
//! 全ルールを評価し、違反は固定順（メディアタイプ、サイズ、拡張子）で返す

use serde::{Deserialize, Serialize};

/// 受け付けるメディアタイプ（大文字小文字を区別しない）
pub const ALLOWED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// 受け付ける拡張子（小文字化したファイル名と比較）
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// 10 MiB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Поддерживаются только файлы .jpg, .jpeg, .png";
pub const TOO_LARGE_MESSAGE: &str = "Размер файла не должен превышать 10MB";
pub const BAD_EXTENSION_MESSAGE: &str = "Файл должен иметь расширение .jpg, .jpeg или .png";

/// 検証結果（違反したルールすべて）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    /// ユーザーに表示する形で連結したメッセージ
    pub fn joined_errors(&self) -> String {
        self.errors.join(", ")
    }
}

/// タイプ・サイズ・拡張子のルールで候補ファイルを検証
pub fn validate_file(name: &str, size: u64, media_type: &str) -> ValidationOutcome {
    let mut errors = Vec::new();

    let media_type = media_type.to_lowercase();
    if !ALLOWED_MEDIA_TYPES.contains(&media_type.as_str()) {
        errors.push(UNSUPPORTED_TYPE_MESSAGE.to_string());
    }

    if size > MAX_FILE_SIZE {
        errors.push(TOO_LARGE_MESSAGE.to_string());
    }

    let name = name.to_lowercase();
    if !ALLOWED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        errors.push(BAD_EXTENSION_MESSAGE.to_string());
    }

    ValidationOutcome {
        is_valid: errors.is_empty(),
        errors,
    }
}
