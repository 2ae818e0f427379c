//! モックアダプタ群
//!
//! テスト・開発用のポート実装。実デバイスには一切触れず、
//! 呼び出しを記録するか合成データを返すだけ。
//! 検出バックエンド未接続の構成では実行時にも使われる。

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::gesture::HandLandmarks;
use crate::domain::ports::{
    ByteStreamPort, CapturePort, DisplayPort, FrameDecoderPort, HandDetectorPort, PointerPort,
};
use crate::domain::types::{Frame, MouseButton};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// モックキャプチャアダプタ
///
/// 呼ばれるたびに一様グレーの合成フレームを返す。
pub struct MockCaptureAdapter {
    width: u32,
    height: u32,
}

impl MockCaptureAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl CapturePort for MockCaptureAdapter {
    fn read_frame(&mut self) -> DomainResult<Option<Frame>> {
        let data = vec![0x80u8; (self.width * self.height) as usize * Frame::BYTES_PER_PIXEL];
        Ok(Some(Frame::new(data, self.width, self.height)))
    }
}

/// モック手検出アダプタ
///
/// 固定のランドマーク集合を返し続けるか、常に失敗する。
pub struct MockDetectorAdapter {
    result: Result<Vec<HandLandmarks>, String>,
}

impl MockDetectorAdapter {
    /// 毎回同じ手を検出するモック
    pub fn returning(hands: Vec<HandLandmarks>) -> Self {
        Self { result: Ok(hands) }
    }

    /// 毎回失敗するモック
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

impl HandDetectorPort for MockDetectorAdapter {
    fn detect_hands(&mut self, _frame: &Frame) -> DomainResult<Vec<HandLandmarks>> {
        match &self.result {
            Ok(hands) => Ok(hands.clone()),
            Err(message) => Err(DomainError::Detection(message.clone())),
        }
    }
}

/// モックポインタが記録するアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    MoveTo(i32, i32),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
}

/// モックポインタアダプタ
///
/// 発行されたアクションを共有ベクタへ記録する。
/// position()はmove_to()を追従する。
pub struct MockPointerAdapter {
    position: (i32, i32),
    screen: (i32, i32),
    actions: Arc<Mutex<Vec<PointerAction>>>,
}

impl MockPointerAdapter {
    /// 初期位置と画面サイズを指定して作成し、アクションログを共有する
    pub fn new(
        position: (i32, i32),
        screen: (i32, i32),
    ) -> (Self, Arc<Mutex<Vec<PointerAction>>>) {
        let actions = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                position,
                screen,
                actions: Arc::clone(&actions),
            },
            actions,
        )
    }

    fn record(&self, action: PointerAction) {
        if let Ok(mut log) = self.actions.lock() {
            log.push(action);
        }
    }
}

impl PointerPort for MockPointerAdapter {
    fn position(&mut self) -> DomainResult<(i32, i32)> {
        Ok(self.position)
    }

    fn screen_size(&mut self) -> DomainResult<(i32, i32)> {
        Ok(self.screen)
    }

    fn move_to(&mut self, x: i32, y: i32) -> DomainResult<()> {
        self.position = (x, y);
        self.record(PointerAction::MoveTo(x, y));
        Ok(())
    }

    fn button_down(&mut self, button: MouseButton) -> DomainResult<()> {
        self.record(PointerAction::ButtonDown(button));
        Ok(())
    }

    fn button_up(&mut self, button: MouseButton) -> DomainResult<()> {
        self.record(PointerAction::ButtonUp(button));
        Ok(())
    }
}

/// モック表示アダプタ
///
/// 表示されたフレームの寸法を記録し、指定回数のポーリング後に
/// 閉鎖要求を返す（Noneなら閉じない）。
pub struct MockDisplayAdapter {
    shown: Arc<Mutex<Vec<(u32, u32)>>>,
    quit_after_polls: Option<u32>,
    polls: u32,
}

impl MockDisplayAdapter {
    pub fn new(quit_after_polls: Option<u32>) -> (Self, Arc<Mutex<Vec<(u32, u32)>>>) {
        let shown = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                shown: Arc::clone(&shown),
                quit_after_polls,
                polls: 0,
            },
            shown,
        )
    }
}

impl DisplayPort for MockDisplayAdapter {
    fn show(&mut self, frame: &Frame) -> DomainResult<()> {
        if let Ok(mut log) = self.shown.lock() {
            log.push((frame.width, frame.height));
        }
        Ok(())
    }

    fn poll_quit(&mut self) -> bool {
        self.polls += 1;
        match self.quit_after_polls {
            Some(n) => self.polls >= n,
            None => false,
        }
    }
}

/// モックバイトストリームアダプタ
///
/// 事前に積んだチャンクを順に返し、尽きたらEOF（Ok(0)）。
pub struct MockStreamAdapter {
    chunks: VecDeque<Vec<u8>>,
    connected: bool,
}

impl MockStreamAdapter {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            connected: false,
        }
    }
}

impl ByteStreamPort for MockStreamAdapter {
    fn connect(&mut self) -> DomainResult<()> {
        self.connected = true;
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> DomainResult<usize> {
        if !self.connected {
            return Err(DomainError::Stream("not connected".to_string()));
        }
        match self.chunks.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}

/// モックフレームデコーダ
///
/// 入力バイト列は無視し、固定寸法の一様グレーのフレームを返す。
pub struct MockDecoderAdapter {
    width: u32,
    height: u32,
}

impl MockDecoderAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FrameDecoderPort for MockDecoderAdapter {
    fn decode(&mut self, _bytes: &[u8]) -> DomainResult<Frame> {
        let data = vec![0x80u8; (self.width * self.height) as usize * Frame::BYTES_PER_PIXEL];
        Ok(Frame::new(data, self.width, self.height))
    }
}
