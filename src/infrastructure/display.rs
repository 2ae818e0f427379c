//! minifbによるプレビューウィンドウアダプタ
//!
//! ウィンドウは最初のフレーム表示時に遅延生成する。
//! フレーム寸法が変わった場合は作り直す。

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::DisplayPort;
use crate::domain::types::Frame;
use minifb::{Key, Window, WindowOptions};

pub struct MinifbDisplayAdapter {
    title: String,
    window: Option<Window>,
    size: (usize, usize),
    buffer: Vec<u32>,
}

// minifbのウィンドウハンドルはプラットフォーム依存だが、
// 生成も更新もプレゼンタスレッド上でのみ行われる
// （アダプタはウィンドウ生成前にスレッドへ移動される）。
unsafe impl Send for MinifbDisplayAdapter {}

impl MinifbDisplayAdapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
            size: (0, 0),
            buffer: Vec::new(),
        }
    }

    fn ensure_window(&mut self, width: usize, height: usize) -> DomainResult<()> {
        if self.window.is_none() || self.size != (width, height) {
            let window = Window::new(&self.title, width, height, WindowOptions::default())
                .map_err(|e| DomainError::Display(format!("failed to open window: {}", e)))?;
            self.window = Some(window);
            self.size = (width, height);
        }
        Ok(())
    }
}

impl DisplayPort for MinifbDisplayAdapter {
    fn show(&mut self, frame: &Frame) -> DomainResult<()> {
        let width = frame.width as usize;
        let height = frame.height as usize;

        // RGB24 → 0RGBのu32パッキング
        self.buffer.clear();
        self.buffer.reserve(width * height);
        for px in frame.data.chunks_exact(Frame::BYTES_PER_PIXEL) {
            let value = (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2]);
            self.buffer.push(value);
        }

        self.ensure_window(width, height)?;
        let buffer = std::mem::take(&mut self.buffer);
        let result = match self.window.as_mut() {
            Some(window) => window
                .update_with_buffer(&buffer, width, height)
                .map_err(|e| DomainError::Display(format!("failed to present frame: {}", e))),
            None => Ok(()),
        };
        self.buffer = buffer;
        result
    }

    fn poll_quit(&mut self) -> bool {
        match &self.window {
            // ウィンドウ生成前に閉鎖扱いにしない
            None => false,
            Some(window) => {
                !window.is_open()
                    || window.is_key_down(Key::Escape)
                    || window.is_key_down(Key::Q)
            }
        }
    }
}
