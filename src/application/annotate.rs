//! フレーム注釈（RGB24直描画）
//!
//! プレビュー用の軽量オーバーレイ。鏡像反転、制御矩形の枠線、
//! 基準点ディスク、ランドマークの点描画をピクセル直書きで行います。
//! 描画順は呼び出し側（ジェスチャワーカー）が決めます。

use crate::domain::gesture::{ControlRect, HandLandmarks};
use crate::domain::types::Frame;

/// 制御矩形の枠線色（緑）
const RECT_COLOR: [u8; 3] = [0, 255, 0];
/// 枠線の太さ（px）
const RECT_THICKNESS: i32 = 2;
/// 基準点ディスクの半径（px）
const REFERENCE_RADIUS: i32 = 8;
/// ランドマーク点の半径（px）
const LANDMARK_RADIUS: i32 = 3;
/// ランドマーク点の色（赤）
const LANDMARK_COLOR: [u8; 3] = [255, 0, 0];

/// フレームを水平方向に鏡像反転する（インプレース）
///
/// カメラ映像は鏡写しで操作する方が直感的なため、
/// 検出前の最初の変換として適用する。
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let row_bytes = width * Frame::BYTES_PER_PIXEL;

    for row in frame.data.chunks_exact_mut(row_bytes) {
        for x in 0..width / 2 {
            let left = x * Frame::BYTES_PER_PIXEL;
            let right = (width - 1 - x) * Frame::BYTES_PER_PIXEL;
            for c in 0..Frame::BYTES_PER_PIXEL {
                row.swap(left + c, right + c);
            }
        }
    }
}

fn put_pixel(frame: &mut Frame, x: i32, y: i32, color: [u8; 3]) {
    if x < 0 || y < 0 || x >= frame.width as i32 || y >= frame.height as i32 {
        return;
    }
    let offset = (y as usize * frame.width as usize + x as usize) * Frame::BYTES_PER_PIXEL;
    frame.data[offset..offset + 3].copy_from_slice(&color);
}

/// 塗りつぶし円を描く
fn fill_disc(frame: &mut Frame, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

/// 制御矩形の枠線を描く
pub fn draw_control_rect(frame: &mut Frame, rect: &ControlRect) {
    for t in 0..RECT_THICKNESS {
        for x in rect.left..=rect.right {
            put_pixel(frame, x, rect.top + t, RECT_COLOR);
            put_pixel(frame, x, rect.bottom - t, RECT_COLOR);
        }
        for y in rect.top..=rect.bottom {
            put_pixel(frame, rect.left + t, y, RECT_COLOR);
            put_pixel(frame, rect.right - t, y, RECT_COLOR);
        }
    }
}

/// 基準点ディスクを描く
///
/// ベースは白。主タッチ中は青チャネル、副タッチ中は緑チャネルを
/// 落として視覚フィードバックにする（主=黄、副=マゼンタ寄り）。
pub fn draw_reference_point(
    frame: &mut Frame,
    point: (i32, i32),
    primary_touch: bool,
    secondary_touch: bool,
) {
    let mut color = [255u8, 255, 255];
    if primary_touch {
        color[2] = 0;
    }
    if secondary_touch {
        color[1] = 0;
    }
    fill_disc(frame, point.0, point.1, REFERENCE_RADIUS, color);
}

/// 検出された手のランドマークを点描する
pub fn draw_landmarks(frame: &mut Frame, hand: &HandLandmarks) {
    let w = frame.width as f32;
    let h = frame.height as f32;
    for point in [
        hand.wrist,
        hand.thumb_tip,
        hand.index_tip,
        hand.middle_tip,
        hand.index_mcp,
        hand.pinky_mcp,
    ] {
        let x = (point.x * w) as i32;
        let y = (point.y * h) as i32;
        fill_disc(frame, x, y, LANDMARK_RADIUS, LANDMARK_COLOR);
    }
}
