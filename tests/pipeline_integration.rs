//! パイプライン統合テスト
//!
//! 全ワーカーを実スレッドで起動し、モックアダプタ経由で
//! フレーム供給 → ジェスチャ判定 → ポインタ駆動 → 表示 → 停止波及の
//! 一連の流れを検証する。

use gesture_pointer::application::orchestrator::{FrameFeed, PipelineRunner};
use gesture_pointer::domain::config::AppConfig;
use gesture_pointer::domain::gesture::{HandLandmarks, Point3};
use gesture_pointer::infrastructure::mocks::{
    MockCaptureAdapter, MockDecoderAdapter, MockDetectorAdapter, MockDisplayAdapter,
    MockPointerAdapter, MockStreamAdapter, PointerAction,
};
use std::time::{Duration, Instant};

/// 制御矩形の中央に基準点がくる、主タッチ中の手
fn touching_hand() -> HandLandmarks {
    HandLandmarks {
        wrist: Point3::new(0.5, 0.5, 0.0),
        index_mcp: Point3::new(0.5, 0.5, 0.5),
        pinky_mcp: Point3::new(0.5, 0.5, 0.5),
        thumb_tip: Point3::new(0.0, 0.0, 0.0),
        index_tip: Point3::new(0.05, 0.0, 0.0),
        middle_tip: Point3::new(0.9, 0.0, 0.0),
    }
}

#[test]
fn display_close_shuts_down_whole_pipeline() {
    let config = AppConfig::default();
    let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
    // 5回目のポーリングで閉鎖要求を返す
    let (display, shown) = MockDisplayAdapter::new(Some(5));

    let mut pipeline = PipelineRunner::start(
        &config,
        FrameFeed::Local {
            capture: Box::new(MockCaptureAdapter::new(640, 480)),
        },
        Box::new(MockDetectorAdapter::returning(vec![touching_hand()])),
        Box::new(pointer),
        Box::new(display),
    );

    // 閉鎖要求 → 波及 → 全スレッド終了までjoinが返る
    pipeline.join();

    for flag in pipeline.flags() {
        assert!(!flag.is_active(), "all workers must end inactive");
    }

    // フレームが表示され、ポインタにも駆動が届いている
    assert!(!shown.lock().unwrap().is_empty(), "frames were presented");
    let log = actions.lock().unwrap();
    assert!(
        log.iter().any(|a| matches!(a, PointerAction::MoveTo(_, _))),
        "pointer was driven while a hand was visible"
    );
    // 主タッチ中のまま終了 → 後始末で解放される
    assert!(log
        .iter()
        .any(|a| matches!(a, PointerAction::ButtonUp(_))));
}

#[test]
fn explicit_stop_clears_every_flag() {
    let config = AppConfig::default();
    let (pointer, _) = MockPointerAdapter::new((500, 500), (1920, 1080));
    // 自発的には閉じない表示
    let (display, _) = MockDisplayAdapter::new(None);

    let mut pipeline = PipelineRunner::start(
        &config,
        FrameFeed::Local {
            capture: Box::new(MockCaptureAdapter::new(320, 240)),
        },
        Box::new(MockDetectorAdapter::returning(vec![])),
        Box::new(pointer),
        Box::new(display),
    );

    std::thread::sleep(Duration::from_millis(50));
    for flag in pipeline.flags() {
        assert!(flag.is_active(), "workers run until stop is requested");
    }

    pipeline.stop();
    let join_started = Instant::now();
    pipeline.join();

    // stopは全ワーカーに行き渡り、joinは速やかに返る
    assert!(join_started.elapsed() < Duration::from_secs(5));
    for flag in pipeline.flags() {
        assert!(!flag.is_active());
    }
}

#[test]
fn remote_feed_runs_and_shuts_down() {
    let config = AppConfig::default();
    let (pointer, _) = MockPointerAdapter::new((500, 500), (1920, 1080));
    let (display, shown) = MockDisplayAdapter::new(Some(10));

    // SOI/EOIマーカー付きの疑似JPEGスパンを2枚
    let mut stream_bytes = vec![0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9];
    stream_bytes.extend_from_slice(&[0xFF, 0xD8, 0x03, 0xFF, 0xD9]);

    let mut pipeline = PipelineRunner::start(
        &config,
        FrameFeed::Remote {
            stream: Box::new(MockStreamAdapter::new(vec![stream_bytes])),
            decoder: Box::new(MockDecoderAdapter::new(320, 240)),
        },
        Box::new(MockDetectorAdapter::returning(vec![])),
        Box::new(pointer),
        Box::new(display),
    );

    pipeline.join();

    for flag in pipeline.flags() {
        assert!(!flag.is_active());
    }
    // デコード済みフレームがプレゼンタまで届いている
    assert!(shown
        .lock()
        .unwrap()
        .iter()
        .all(|(w, h)| (*w, *h) == (320, 240)));
}

#[test]
fn detector_failure_terminates_pipeline() {
    let config = AppConfig::default();
    let (pointer, _) = MockPointerAdapter::new((500, 500), (1920, 1080));
    let (display, _) = MockDisplayAdapter::new(None);

    let mut pipeline = PipelineRunner::start(
        &config,
        FrameFeed::Local {
            capture: Box::new(MockCaptureAdapter::new(320, 240)),
        },
        Box::new(MockDetectorAdapter::failing("backend unavailable")),
        Box::new(pointer),
        Box::new(display),
    );

    // 検出失敗は自力で全ワーカーを止める
    pipeline.join();
    for flag in pipeline.flags() {
        assert!(!flag.is_active());
    }
}
