//! enigoによるOSポインタアダプタ
//!
//! enigoのマウス操作は同期APIで失敗を返さないため、
//! エラーはこの層では発生しない（Resultはポート契約に合わせた形）。

use crate::domain::error::DomainResult;
use crate::domain::ports::PointerPort;
use crate::domain::types::MouseButton;
use enigo::{Enigo, MouseControllable};

pub struct EnigoPointerAdapter {
    enigo: Enigo,
}

// Enigoはプラットフォームハンドルを含むが、このアダプタは
// ポインタ駆動スレッドへ移動された後そのスレッドでのみ使われる。
unsafe impl Send for EnigoPointerAdapter {}

impl EnigoPointerAdapter {
    pub fn new() -> Self {
        Self {
            enigo: Enigo::new(),
        }
    }

    fn map_button(button: MouseButton) -> enigo::MouseButton {
        match button {
            MouseButton::Primary => enigo::MouseButton::Left,
            MouseButton::Secondary => enigo::MouseButton::Right,
        }
    }
}

impl Default for EnigoPointerAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerPort for EnigoPointerAdapter {
    fn position(&mut self) -> DomainResult<(i32, i32)> {
        Ok(self.enigo.mouse_location())
    }

    fn screen_size(&mut self) -> DomainResult<(i32, i32)> {
        Ok(self.enigo.main_display_size())
    }

    fn move_to(&mut self, x: i32, y: i32) -> DomainResult<()> {
        self.enigo.mouse_move_to(x, y);
        Ok(())
    }

    fn button_down(&mut self, button: MouseButton) -> DomainResult<()> {
        self.enigo.mouse_down(Self::map_button(button));
        Ok(())
    }

    fn button_up(&mut self, button: MouseButton) -> DomainResult<()> {
        self.enigo.mouse_up(Self::map_button(button));
        Ok(())
    }
}
