//! ジェスチャ判定ワーカーとパイプライン組み立て
//!
//! ジェスチャワーカーは最新フレームを取り込み、手検出 → タッチ判定 →
//! 座標写像 → ポインタ目標の更新 → 注釈フレームの発行を1tickで行います。
//! 停止の波及もここが担当: プレゼンタのフラグが下りたのを観測したら
//! 全ワーカーのフラグを下ろします。

use crate::application::annotate;
use crate::application::latest::LatestCell;
use crate::application::pointer_driver::{PointerControl, PointerDriver};
use crate::application::presenter::Presenter;
use crate::application::stats::{StatKind, StatsCollector};
use crate::application::worker::{LifecycleFlag, Tickable, WorkerHandle};
use crate::application::frame_source::{FrameSource, RemoteFrameSource};
use crate::domain::config::AppConfig;
use crate::domain::gesture::{classify_hand, ControlRect};
use crate::domain::ports::{
    ByteStreamPort, CapturePort, DisplayPort, FrameDecoderPort, HandDetectorPort, PointerPort,
};
use crate::domain::types::Frame;
use crate::measure_span;
use std::sync::Arc;
use std::time::Instant;

/// ジェスチャ判定のtickワーカー
pub struct GestureTick {
    frames: Arc<LatestCell<Frame>>,
    display_frames: Arc<LatestCell<Frame>>,
    detector: Box<dyn HandDetectorPort>,
    control: PointerControl,
    touch_threshold: f32,
    logical_width: i32,
    logical_height: i32,
    stats: StatsCollector,
    /// 監視対象: プレゼンタのフラグ（閉鎖要求の発信元）
    presenter_flag: LifecycleFlag,
    /// 停止波及先: 自分を含む全ワーカーのフラグ
    cascade: Vec<LifecycleFlag>,
}

impl GestureTick {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frames: Arc<LatestCell<Frame>>,
        display_frames: Arc<LatestCell<Frame>>,
        detector: Box<dyn HandDetectorPort>,
        control: PointerControl,
        config: &AppConfig,
        presenter_flag: LifecycleFlag,
        cascade: Vec<LifecycleFlag>,
    ) -> Self {
        Self {
            frames,
            display_frames,
            detector,
            control,
            touch_threshold: config.gesture.touch_threshold,
            logical_width: config.pointer.logical_width,
            logical_height: config.pointer.logical_height,
            stats: StatsCollector::new(config.pipeline.stats_interval()),
            presenter_flag,
            cascade,
        }
    }

    /// 全ワーカーへ停止を波及させる（自分のフラグも含む）
    fn shutdown_all(&self) {
        tracing::info!("propagating shutdown to all workers");
        for flag in &self.cascade {
            flag.deactivate();
        }
    }
}

impl Tickable for GestureTick {
    fn step(&mut self) {
        // 閉鎖要求の監視が最優先
        if !self.presenter_flag.is_active() {
            self.shutdown_all();
            return;
        }

        let Some(mut frame) = self.frames.snapshot() else {
            return;
        };

        let tick_start = Instant::now();

        // 鏡像操作の方が直感的なため、検出前に反転する
        annotate::mirror_horizontal(&mut frame);

        let detect_start = Instant::now();
        let detected = measure_span!("detect_hands", self.detector.detect_hands(&frame));
        let hands = match detected {
            Ok(hands) => hands,
            Err(e) => {
                // 検出器の失敗はパイプライン全体に対して致命的
                tracing::error!("hand detection failed, shutting down: {}", e);
                self.shutdown_all();
                return;
            }
        };
        self.stats.record(StatKind::Detect, detect_start.elapsed());

        let annotate_start = Instant::now();
        let rect = ControlRect::centered(frame.width, frame.height);
        annotate::draw_control_rect(&mut frame, &rect);
        for hand in &hands {
            annotate::draw_landmarks(&mut frame, hand);
        }

        // ちょうど1つの手が写っているときだけ制御する
        if let [hand] = hands.as_slice() {
            let sample = classify_hand(
                hand,
                frame.width,
                frame.height,
                self.touch_threshold,
                self.logical_width,
                self.logical_height,
            );
            if let Some((sx, sy)) = sample.screen_target {
                self.control
                    .update(sx, sy, sample.primary_touch, sample.secondary_touch);
            }
            let reference = hand.reference_point(frame.width, frame.height);
            annotate::draw_reference_point(
                &mut frame,
                reference,
                sample.primary_touch,
                sample.secondary_touch,
            );
        } else {
            self.control.deactivate();
        }
        self.stats.record(StatKind::Annotate, annotate_start.elapsed());

        self.display_frames.publish(frame);

        self.stats.record(StatKind::EndToEnd, tick_start.elapsed());
        if self.stats.should_report() {
            self.stats.report_and_reset();
        }
    }
}

/// フレーム供給元の選択
pub enum FrameFeed {
    /// ローカルカメラ（tick駆動）
    Local { capture: Box<dyn CapturePort> },
    /// リモートMJPEGストリーム（到着レート駆動）
    Remote {
        stream: Box<dyn ByteStreamPort>,
        decoder: Box<dyn FrameDecoderPort>,
    },
}

/// パイプライン全体の組み立てと起動
pub struct PipelineRunner;

impl PipelineRunner {
    /// 全ワーカーを起動して稼働中パイプラインを返す
    ///
    /// 起動順はリーフから: ソース → ポインタ → プレゼンタ → ジェスチャ。
    /// ジェスチャワーカーが最後に起動した時点で全フラグが立っている。
    pub fn start(
        config: &AppConfig,
        feed: FrameFeed,
        detector: Box<dyn HandDetectorPort>,
        pointer: Box<dyn PointerPort>,
        display: Box<dyn DisplayPort>,
    ) -> RunningPipeline {
        let frames: Arc<LatestCell<Frame>> = Arc::new(LatestCell::new());
        let display_frames: Arc<LatestCell<Frame>> = Arc::new(LatestCell::new());
        let control = PointerControl::new();

        let source = match feed {
            FrameFeed::Local { capture } => WorkerHandle::spawn(
                "frame-source",
                config.source.capture_rate_hz,
                LifecycleFlag::new(),
                FrameSource::new(capture, Arc::clone(&frames)),
            ),
            FrameFeed::Remote { stream, decoder } => {
                let remote = RemoteFrameSource::new(
                    stream,
                    decoder,
                    config.source.max_stream_buffer_bytes,
                    Arc::clone(&frames),
                );
                WorkerHandle::spawn_with("stream-source", LifecycleFlag::new(), move |flag| {
                    remote.run(flag)
                })
            }
        };

        let pointer = WorkerHandle::spawn(
            "pointer-driver",
            config.pointer.rate_hz,
            LifecycleFlag::new(),
            PointerDriver::new(pointer, control.clone(), config.pointer.clone()),
        );

        let presenter_flag = LifecycleFlag::new();
        let presenter = WorkerHandle::spawn(
            "presenter",
            config.presenter.rate_hz,
            presenter_flag.clone(),
            Presenter::new(display, Arc::clone(&display_frames), presenter_flag.clone()),
        );

        let gesture_flag = LifecycleFlag::new();
        let cascade = vec![
            gesture_flag.clone(),
            presenter.flag(),
            pointer.flag(),
            source.flag(),
        ];
        let gesture = WorkerHandle::spawn(
            "gesture",
            config.pipeline.tick_rate_hz,
            gesture_flag,
            GestureTick::new(
                frames,
                display_frames,
                detector,
                control,
                config,
                presenter_flag,
                cascade,
            ),
        );

        RunningPipeline {
            source,
            pointer,
            presenter,
            gesture,
        }
    }

    /// 起動して全ワーカーの終了まで待つ（通常のmain経路）
    pub fn run(
        config: &AppConfig,
        feed: FrameFeed,
        detector: Box<dyn HandDetectorPort>,
        pointer: Box<dyn PointerPort>,
        display: Box<dyn DisplayPort>,
    ) {
        let mut pipeline = Self::start(config, feed, detector, pointer, display);
        pipeline.join();
    }
}

/// 稼働中パイプラインのハンドル
pub struct RunningPipeline {
    source: WorkerHandle,
    pointer: WorkerHandle,
    presenter: WorkerHandle,
    gesture: WorkerHandle,
}

impl RunningPipeline {
    /// 全ワーカーへ停止を要求する（ノンブロッキング）
    pub fn stop(&self) {
        self.gesture.stop();
        self.presenter.stop();
        self.pointer.stop();
        self.source.stop();
    }

    /// 全ワーカーの終了を待つ
    ///
    /// ジェスチャワーカーを最初に待つ。閉鎖要求はジェスチャ経由で
    /// 波及するため、先に波及元が終わってから各リーフを待つ。
    pub fn join(&mut self) {
        self.gesture.join();
        self.presenter.join();
        self.pointer.join();
        self.source.join();
        tracing::info!("pipeline shut down");
    }

    /// 各ワーカーのフラグ（テスト用の観測点）
    pub fn flags(&self) -> Vec<LifecycleFlag> {
        vec![
            self.gesture.flag(),
            self.presenter.flag(),
            self.pointer.flag(),
            self.source.flag(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gesture::{HandLandmarks, Point3};
    use crate::infrastructure::mocks::MockDetectorAdapter;

    fn centered_hand() -> HandLandmarks {
        HandLandmarks {
            wrist: Point3::new(0.5, 0.5, 0.0),
            index_mcp: Point3::new(0.5, 0.5, 0.5),
            pinky_mcp: Point3::new(0.5, 0.5, 0.5),
            thumb_tip: Point3::new(0.0, 0.0, 0.0),
            index_tip: Point3::new(0.05, 0.0, 0.0),
            middle_tip: Point3::new(0.9, 0.0, 0.0),
        }
    }

    fn test_config() -> AppConfig {
        AppConfig::default()
    }

    fn test_flags() -> (LifecycleFlag, Vec<LifecycleFlag>) {
        let presenter = LifecycleFlag::new();
        presenter.activate();
        let own = LifecycleFlag::new();
        own.activate();
        (presenter.clone(), vec![own, presenter])
    }

    fn make_tick(
        detector: MockDetectorAdapter,
        frames: Arc<LatestCell<Frame>>,
        display: Arc<LatestCell<Frame>>,
        control: PointerControl,
    ) -> (GestureTick, LifecycleFlag, Vec<LifecycleFlag>) {
        let (presenter_flag, cascade) = test_flags();
        let tick = GestureTick::new(
            frames,
            display,
            Box::new(detector),
            control,
            &test_config(),
            presenter_flag.clone(),
            cascade.clone(),
        );
        (tick, presenter_flag, cascade)
    }

    #[test]
    fn test_single_hand_drives_pointer_target() {
        let frames = Arc::new(LatestCell::new());
        frames.publish(Frame::new(vec![0u8; 640 * 480 * 3], 640, 480));
        let display = Arc::new(LatestCell::new());
        let control = PointerControl::new();

        let detector = MockDetectorAdapter::returning(vec![centered_hand()]);
        let (mut tick, _, _) =
            make_tick(detector, frames, Arc::clone(&display), control.clone());

        tick.step();

        // 注釈フレームが発行され、目標が書き込まれている
        assert!(display.snapshot().is_some());
        assert!(control.is_active());
    }

    #[test]
    fn test_no_hand_deactivates_control() {
        let frames = Arc::new(LatestCell::new());
        frames.publish(Frame::new(vec![0u8; 640 * 480 * 3], 640, 480));
        let display = Arc::new(LatestCell::new());
        let control = PointerControl::new();
        control.update(10, 10, true, false);

        let detector = MockDetectorAdapter::returning(vec![]);
        let (mut tick, _, _) = make_tick(detector, frames, display, control.clone());

        tick.step();
        assert!(!control.is_active());
    }

    #[test]
    fn test_two_hands_do_not_control() {
        let frames = Arc::new(LatestCell::new());
        frames.publish(Frame::new(vec![0u8; 640 * 480 * 3], 640, 480));
        let display = Arc::new(LatestCell::new());

        let detector = MockDetectorAdapter::returning(vec![centered_hand(), centered_hand()]);
        let control = PointerControl::new();
        let (mut tick, _, _) =
            make_tick(detector, frames, Arc::clone(&display), control.clone());

        tick.step();
        // 注釈フレームは出るが制御はされない
        assert!(display.snapshot().is_some());
        assert!(!control.is_active());
    }

    #[test]
    fn test_no_frame_is_a_quiet_tick() {
        let frames: Arc<LatestCell<Frame>> = Arc::new(LatestCell::new());
        let display = Arc::new(LatestCell::new());

        let detector = MockDetectorAdapter::returning(vec![centered_hand()]);
        let (mut tick, _, _) =
            make_tick(detector, frames, Arc::clone(&display), PointerControl::new());

        tick.step();
        assert!(display.snapshot().is_none());
    }

    #[test]
    fn test_detection_failure_cascades_shutdown() {
        let frames = Arc::new(LatestCell::new());
        frames.publish(Frame::new(vec![0u8; 640 * 480 * 3], 640, 480));
        let display = Arc::new(LatestCell::new());

        let detector = MockDetectorAdapter::failing("model crashed");
        let (mut tick, _, cascade) =
            make_tick(detector, frames, display, PointerControl::new());

        tick.step();
        for flag in &cascade {
            assert!(!flag.is_active());
        }
    }

    #[test]
    fn test_presenter_closure_cascades_shutdown() {
        let frames: Arc<LatestCell<Frame>> = Arc::new(LatestCell::new());
        let display = Arc::new(LatestCell::new());

        let detector = MockDetectorAdapter::returning(vec![]);
        let (mut tick, presenter_flag, cascade) =
            make_tick(detector, frames, display, PointerControl::new());

        presenter_flag.deactivate();
        tick.step();

        for flag in &cascade {
            assert!(!flag.is_active());
        }
    }
}
