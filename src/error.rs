use thiserror::Error;

/// プレビューハンドル失敗時の固定メッセージ
pub const UPLOAD_FAILED_MESSAGE: &str = "Не удалось загрузить файл. Попробуйте другой.";

/// 解析できなかったときの固定メッセージ
pub const ANALYSIS_FAILED_MESSAGE: &str = "Ошибка при анализе изображения. Попробуйте еще раз.";

#[derive(Error, Debug)]
pub enum InspectorError {
    /// アップロードルール違反（メッセージはそのまま表示）
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{}", UPLOAD_FAILED_MESSAGE)]
    Upload,

    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    Analysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API call failed: {0}")]
    ApiCall(String),

    #[error("API response could not be parsed: {0}")]
    ApiParse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] car_inspector_common::Error),
}

pub type Result<T> = std::result::Result<T, InspectorError>;
