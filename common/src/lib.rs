//! Car Inspector 共通ライブラリ
//!
//! 各フロントエンドで共有する型と純粋ロジック:
//! 損傷レポートのモデル、アップロード検証ルール、検出APIレスポンスの変換、
//! オフライン用モック生成、表示用ヘルパー。このクレートはI/Oを行わない

pub mod types;
pub mod error;
pub mod validator;
pub mod parser;
pub mod analyzer;
pub mod mock;
pub mod format;

pub use types::{
    AnalysisResult, BoundingBox, CarCondition, DefectCounts, DefectType, Detection, Provenance,
};
pub use error::{Error, Result};
pub use validator::{validate_file, ValidationOutcome, MAX_FILE_SIZE};
pub use parser::{parse_detect_response, ApiDetection, ApiResponse};
pub use analyzer::{average_confidence, map_api_response};
pub use mock::{generate_mock_result, ImageBounds};
