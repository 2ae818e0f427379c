//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

/// フレームソースの種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// ローカルカメラ（tick駆動）
    #[default]
    Camera,
    /// リモートMJPEGストリーム（ネットワーク到着レート駆動）
    Stream,
}

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// フレームソース設定
    pub source: SourceConfig,
    /// ジェスチャ判定設定
    pub gesture: GestureConfig,
    /// ポインタ駆動設定
    pub pointer: PointerConfig,
    /// 表示設定
    pub presenter: PresenterConfig,
    /// パイプライン設定
    pub pipeline: PipelineConfig,
}

/// フレームソース設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourceConfig {
    /// フレームソースの種別
    ///
    /// 選択肢: "camera", "stream"
    /// デフォルト: "camera"
    #[serde(default)]
    pub kind: SourceKind,

    /// カメラデバイスのインデックス（kind = "camera" の場合のみ有効）
    ///
    /// 通常は0
    pub camera_index: u32,

    /// MJPEGストリームのURL（kind = "stream" の場合は必須）
    #[serde(default)]
    pub stream_url: String,

    /// ローカルカメラの読み取りレート（ticks/秒）
    ///
    /// デフォルト: 120
    pub capture_rate_hz: f64,

    /// ストリーム受信バッファの上限（バイト）
    ///
    /// マーカーが見つからないままこのサイズを超えた場合、
    /// バッファを破棄して警告を出す。
    /// デフォルト: 4194304 (4MiB)
    pub max_stream_buffer_bytes: usize,
}

impl SourceConfig {
    /// デフォルトのカメラ読み取りレート
    pub const DEFAULT_CAPTURE_RATE_HZ: f64 = 120.0;
    /// デフォルトのストリームバッファ上限（4MiB）
    pub const DEFAULT_MAX_STREAM_BUFFER_BYTES: usize = 4 * 1024 * 1024;
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            camera_index: 0,
            stream_url: String::new(),
            capture_rate_hz: Self::DEFAULT_CAPTURE_RATE_HZ,
            max_stream_buffer_bytes: Self::DEFAULT_MAX_STREAM_BUFFER_BYTES,
        }
    }
}

/// ジェスチャ判定設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GestureConfig {
    /// タッチ判定の閾値（手のひらサイズ比、排他的境界）
    ///
    /// 親指-指先の正規化距離がこの値未満でタッチとみなす。
    /// デフォルト: 0.15
    pub touch_threshold: f32,
}

impl GestureConfig {
    /// デフォルトのタッチ閾値
    pub const DEFAULT_TOUCH_THRESHOLD: f32 = 0.15;
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_threshold: Self::DEFAULT_TOUCH_THRESHOLD,
        }
    }
}

/// ポインタ駆動設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PointerConfig {
    /// ポインタ駆動tickレート（ticks/秒）
    ///
    /// デフォルト: 120
    pub rate_hz: f64,

    /// 距離比例ゲイン
    ///
    /// 1tickの移動割合 f = distance_gain * d + min_gain。
    /// 遠距離ほど速く追従する。
    /// デフォルト: 0.0005
    pub distance_gain: f64,

    /// 最小ゲイン
    ///
    /// fの下限。0より大きい限り目標への収束が保証される。
    /// デフォルト: 0.003
    pub min_gain: f64,

    /// 論理スクリーン幅（写像先、実解像度とは独立）
    ///
    /// デフォルト: 1920
    pub logical_width: i32,

    /// 論理スクリーン高さ
    ///
    /// デフォルト: 1080
    pub logical_height: i32,

    /// 終了時に押下中のボタンを解放するか
    ///
    /// デフォルト: true
    pub release_buttons_on_exit: bool,
}

impl PointerConfig {
    pub const DEFAULT_RATE_HZ: f64 = 120.0;
    pub const DEFAULT_DISTANCE_GAIN: f64 = 0.0005;
    pub const DEFAULT_MIN_GAIN: f64 = 0.003;
    pub const DEFAULT_LOGICAL_WIDTH: i32 = 1920;
    pub const DEFAULT_LOGICAL_HEIGHT: i32 = 1080;
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            rate_hz: Self::DEFAULT_RATE_HZ,
            distance_gain: Self::DEFAULT_DISTANCE_GAIN,
            min_gain: Self::DEFAULT_MIN_GAIN,
            logical_width: Self::DEFAULT_LOGICAL_WIDTH,
            logical_height: Self::DEFAULT_LOGICAL_HEIGHT,
            release_buttons_on_exit: true,
        }
    }
}

/// 表示設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PresenterConfig {
    /// 表示リフレッシュレート（ticks/秒）
    ///
    /// デフォルト: 30
    pub rate_hz: f64,

    /// 表示ウィンドウのタイトル
    pub window_title: String,
}

impl PresenterConfig {
    pub const DEFAULT_RATE_HZ: f64 = 30.0;
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            rate_hz: Self::DEFAULT_RATE_HZ,
            window_title: "Video Stream".to_string(),
        }
    }
}

/// パイプライン設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    /// オーケストレータ（ジェスチャ処理）のtickレート（ticks/秒）
    ///
    /// デフォルト: 60
    pub tick_rate_hz: f64,

    /// 統計情報の出力間隔（秒）
    pub stats_interval_sec: u64,
}

impl PipelineConfig {
    pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;
    pub const DEFAULT_STATS_INTERVAL_SEC: u64 = 10;

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_sec)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            stats_interval_sec: Self::DEFAULT_STATS_INTERVAL_SEC,
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Configuration(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| DomainError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        // レートの検証（全ワーカー共通）
        for (name, rate) in [
            ("source.capture_rate_hz", self.source.capture_rate_hz),
            ("pointer.rate_hz", self.pointer.rate_hz),
            ("presenter.rate_hz", self.presenter.rate_hz),
            ("pipeline.tick_rate_hz", self.pipeline.tick_rate_hz),
        ] {
            if !(rate > 0.0) {
                return Err(DomainError::Configuration(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        // ストリームソースはURL必須
        if self.source.kind == SourceKind::Stream && self.source.stream_url.is_empty() {
            return Err(DomainError::Configuration(
                "source.stream_url is required when source.kind = \"stream\"".to_string(),
            ));
        }

        if self.source.max_stream_buffer_bytes == 0 {
            return Err(DomainError::Configuration(
                "source.max_stream_buffer_bytes must be greater than 0".to_string(),
            ));
        }

        // タッチ閾値の検証
        let threshold = self.gesture.touch_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(DomainError::Configuration(
                "gesture.touch_threshold must be within (0, 1)".to_string(),
            ));
        }

        // ポインタ移動式の検証（min_gain > 0 が収束の前提）
        if !(self.pointer.min_gain > 0.0) {
            return Err(DomainError::Configuration(
                "pointer.min_gain must be greater than 0".to_string(),
            ));
        }
        if self.pointer.distance_gain < 0.0 {
            return Err(DomainError::Configuration(
                "pointer.distance_gain must be non-negative".to_string(),
            ));
        }
        if self.pointer.logical_width <= 0 || self.pointer.logical_height <= 0 {
            return Err(DomainError::Configuration(
                "pointer logical resolution must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
