/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - tick内の一時的な失敗はスキップ/deactivateに縮退させ、パイプラインを止めない

use thiserror::Error;

/// Domain層の統一エラー型
#[derive(Error, Debug)]
pub enum DomainError {
    /// フレーム取得関連のエラー
    #[error("Capture error: {0}")]
    Capture(String),

    /// リモートストリーム関連のエラー
    #[error("Stream error: {0}")]
    Stream(String),

    /// JPEGデコード関連のエラー
    #[error("Decode error: {0}")]
    Decode(String),

    /// 手ランドマーク検出関連のエラー
    #[error("Detection error: {0}")]
    Detection(String),

    /// ポインタ操作関連のエラー
    #[error("Pointer error: {0}")]
    Pointer(String),

    /// 表示関連のエラー
    #[error("Display error: {0}")]
    Display(String),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// その他のエラー
    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;
