//! フレームソースワーカー
//!
//! ローカルカメラ（tick駆動）とリモートMJPEGストリーム
//! （ネットワーク到着レート駆動）の2系統。どちらも最新フレームを
//! `LatestCell`へ発行するだけで、下流とは直接やり取りしない。

use crate::application::latest::LatestCell;
use crate::application::mjpeg::JpegStreamScanner;
use crate::application::worker::{LifecycleFlag, Tickable};
use crate::domain::ports::{ByteStreamPort, CapturePort, FrameDecoderPort};
use crate::domain::types::Frame;
use std::sync::Arc;

/// ローカルカメラのフレームソース
///
/// tick: 1フレーム読み取り → セルへ発行。読み取り失敗はログのみで
/// スキップする（単発のグリッチ想定、リトライやバックオフはしない）。
pub struct FrameSource {
    capture: Box<dyn CapturePort>,
    frames: Arc<LatestCell<Frame>>,
}

impl FrameSource {
    pub fn new(capture: Box<dyn CapturePort>, frames: Arc<LatestCell<Frame>>) -> Self {
        Self { capture, frames }
    }
}

impl Tickable for FrameSource {
    fn step(&mut self) {
        match self.capture.read_frame() {
            Ok(Some(frame)) => {
                self.frames.publish(frame);
            }
            Ok(None) => {
                // 新しいフレームなし - このtickはスキップ
            }
            Err(e) => {
                tracing::warn!("frame read failed, skipping tick: {}", e);
            }
        }
    }
}

/// リモートMJPEGストリームのフレームソース
///
/// tick-and-sleepテンプレートは使わず、ネットワークの配信レートで回る。
/// ライフサイクルフラグの観測はデコード済みフレーム1枚につき1回
/// （他ワーカーより粗いキャンセル粒度。接続が黙り込むと停止が
/// 次の到着まで遅れる）。
pub struct RemoteFrameSource {
    stream: Box<dyn ByteStreamPort>,
    decoder: Box<dyn FrameDecoderPort>,
    scanner: JpegStreamScanner,
    frames: Arc<LatestCell<Frame>>,
}

impl RemoteFrameSource {
    /// 受信チャンクの読み取り単位
    const CHUNK_SIZE: usize = 1024;

    pub fn new(
        stream: Box<dyn ByteStreamPort>,
        decoder: Box<dyn FrameDecoderPort>,
        max_buffer_bytes: usize,
        frames: Arc<LatestCell<Frame>>,
    ) -> Self {
        Self {
            stream,
            decoder,
            scanner: JpegStreamScanner::new(max_buffer_bytes),
            frames,
        }
    }

    /// ストリーム受信ループ（ブロッキング）
    ///
    /// 接続失敗はこのソースに対してのみ致命的: ログを出してループを
    /// 終える。再接続はしない。下流は以後「フレームなし」を見続ける。
    pub fn run(mut self, flag: LifecycleFlag) {
        if let Err(e) = self.stream.connect() {
            tracing::error!("failed to get video feed: {}", e);
            return;
        }

        let mut chunk = [0u8; Self::CHUNK_SIZE];
        loop {
            let received = match self.stream.read_chunk(&mut chunk) {
                Ok(0) => {
                    tracing::info!("video stream ended");
                    return;
                }
                Ok(n) => n,
                Err(e) => {
                    tracing::error!("video stream read failed: {}", e);
                    return;
                }
            };

            for span in self.scanner.feed(&chunk[..received]) {
                match self.decoder.decode(&span) {
                    Ok(frame) => self.frames.publish(frame),
                    Err(e) => {
                        tracing::warn!("dropping undecodable frame: {}", e);
                        continue;
                    }
                }

                if !flag.is_active() {
                    return;
                }
            }
        }
    }
}
