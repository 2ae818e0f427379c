//! プレビュー表示ワーカー
//!
//! 注釈済みフレームの最新値を自分のレートで表示し、
//! ウィンドウ閉鎖を検知したら自分のライフサイクルフラグを下ろします。
//! 全体の停止波及はジェスチャワーカーが担当します。

use crate::application::latest::LatestCell;
use crate::application::worker::{LifecycleFlag, Tickable};
use crate::domain::ports::DisplayPort;
use crate::domain::types::Frame;
use std::sync::Arc;

pub struct Presenter {
    display: Box<dyn DisplayPort>,
    frames: Arc<LatestCell<Frame>>,
    // 自分自身のフラグ。閉鎖要求を検知したらここを下ろす
    own_flag: LifecycleFlag,
}

impl Presenter {
    pub fn new(
        display: Box<dyn DisplayPort>,
        frames: Arc<LatestCell<Frame>>,
        own_flag: LifecycleFlag,
    ) -> Self {
        Self {
            display,
            frames,
            own_flag,
        }
    }
}

impl Tickable for Presenter {
    fn step(&mut self) {
        if let Some(frame) = self.frames.snapshot() {
            if let Err(e) = self.display.show(&frame) {
                tracing::warn!("failed to present frame: {}", e);
            }
        }

        if self.display.poll_quit() {
            tracing::info!("close requested from display");
            self.own_flag.deactivate();
        }
    }
}
