use anyhow::Context;
use gesture_pointer::application::orchestrator::{FrameFeed, PipelineRunner};
use gesture_pointer::domain::config::{AppConfig, SourceKind};
use gesture_pointer::domain::ports::{CapturePort, DisplayPort, PointerPort};
use gesture_pointer::infrastructure::http_stream::HttpStreamAdapter;
use gesture_pointer::infrastructure::jpeg_decode::ZuneJpegDecoder;
use gesture_pointer::infrastructure::mocks::MockDetectorAdapter;
use gesture_pointer::logging::init_logging;
use std::path::PathBuf;

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("gesture-pointer starting...");

    match run() {
        Ok(_) => {
            tracing::info!("gesture-pointer terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> anyhow::Result<()> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate().context("invalid configuration")?;

    tracing::info!("Configuration validated successfully");
    tracing::info!(
        "Source: kind={:?}, capture_rate={}Hz",
        config.source.kind,
        config.source.capture_rate_hz
    );
    tracing::info!(
        "Pointer: rate={}Hz, logical={}x{}, gains=({}, {})",
        config.pointer.rate_hz,
        config.pointer.logical_width,
        config.pointer.logical_height,
        config.pointer.distance_gain,
        config.pointer.min_gain
    );

    let feed = match config.source.kind {
        SourceKind::Camera => FrameFeed::Local {
            capture: build_capture(&config)?,
        },
        SourceKind::Stream => {
            tracing::info!("Using MJPEG stream source: {}", config.source.stream_url);
            FrameFeed::Remote {
                stream: Box::new(HttpStreamAdapter::new(&config.source.stream_url)),
                decoder: Box::new(ZuneJpegDecoder::new()),
            }
        }
    };

    // モック検出アダプタの初期化（実際の検出バックエンドは未接続）
    tracing::info!("Initializing mock hand detector (no detection backend wired)...");
    let detector = MockDetectorAdapter::returning(vec![]);

    let pointer = build_pointer();
    let display = build_display(&config.presenter.window_title);

    tracing::info!("Starting pipeline with 4-thread architecture...");
    tracing::info!("Threads: Source -> Gesture -> Pointer / Presenter");

    // パイプラインの起動（全ワーカー終了までブロッキング）
    PipelineRunner::run(&config, feed, Box::new(detector), pointer, display);

    Ok(())
}

#[cfg(feature = "camera-nokhwa")]
fn build_capture(config: &AppConfig) -> anyhow::Result<Box<dyn CapturePort>> {
    use gesture_pointer::infrastructure::camera::NokhwaCameraAdapter;

    tracing::info!("Opening camera {}...", config.source.camera_index);
    let capture = NokhwaCameraAdapter::open(config.source.camera_index)
        .context("failed to initialize camera")?;
    Ok(Box::new(capture))
}

#[cfg(not(feature = "camera-nokhwa"))]
fn build_capture(_config: &AppConfig) -> anyhow::Result<Box<dyn CapturePort>> {
    use gesture_pointer::infrastructure::mocks::MockCaptureAdapter;

    tracing::warn!("camera-nokhwa feature disabled, using mock capture");
    Ok(Box::new(MockCaptureAdapter::new(640, 480)))
}

#[cfg(feature = "pointer-enigo")]
fn build_pointer() -> Box<dyn PointerPort> {
    use gesture_pointer::infrastructure::pointer::EnigoPointerAdapter;

    Box::new(EnigoPointerAdapter::new())
}

#[cfg(not(feature = "pointer-enigo"))]
fn build_pointer() -> Box<dyn PointerPort> {
    use gesture_pointer::infrastructure::mocks::MockPointerAdapter;

    tracing::warn!("pointer-enigo feature disabled, pointer actions go to a mock");
    let (pointer, _) = MockPointerAdapter::new((0, 0), (1920, 1080));
    Box::new(pointer)
}

#[cfg(feature = "display-minifb")]
fn build_display(title: &str) -> Box<dyn DisplayPort> {
    use gesture_pointer::infrastructure::display::MinifbDisplayAdapter;

    Box::new(MinifbDisplayAdapter::new(title))
}

#[cfg(not(feature = "display-minifb"))]
fn build_display(_title: &str) -> Box<dyn DisplayPort> {
    use gesture_pointer::infrastructure::mocks::MockDisplayAdapter;

    tracing::warn!("display-minifb feature disabled, frames are not shown");
    let (display, _) = MockDisplayAdapter::new(None);
    Box::new(display)
}
