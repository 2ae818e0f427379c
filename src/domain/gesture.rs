//! ジェスチャ幾何
//!
//! 手ランドマークからのタッチ判定・基準点計算と、
//! 中央矩形から論理スクリーン座標への写像。
//! すべて状態を持たない純粋な数値関数。

use crate::domain::types::GestureSample;

/// 正規化3D座標のランドマーク点
///
/// x/yは画像サイズで正規化された[0,1]付近の値、zはカメラからの相対深度。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 2点間の3Dユークリッド距離
    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// 1つの手のランドマーク集合
///
/// 検出バックエンドから受け取る最小限の点のみを保持する。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandLandmarks {
    /// 手首
    pub wrist: Point3,
    /// 親指先端
    pub thumb_tip: Point3,
    /// 人差し指先端
    pub index_tip: Point3,
    /// 中指先端
    pub middle_tip: Point3,
    /// 人差し指付け根（MCP）
    pub index_mcp: Point3,
    /// 小指付け根（MCP）
    pub pinky_mcp: Point3,
}

impl HandLandmarks {
    /// 手のひらサイズ（スケール正規化用の距離指標）
    ///
    /// 手首-人差し指付け根と手首-小指付け根の3D距離の和。
    /// 手の大きさやカメラ距離に対して不変な比率計算の分母になる。
    pub fn palm_size(&self) -> f32 {
        self.wrist.distance(&self.index_mcp) + self.wrist.distance(&self.pinky_mcp)
    }

    /// 親指-人差し指タッチ判定（primary）
    ///
    /// 正規化距離が閾値未満（排他的境界）ならタッチとみなす。
    pub fn primary_touch(&self, threshold: f32) -> bool {
        self.relative_distance(&self.index_tip) < threshold
    }

    /// 親指-中指タッチ判定（secondary）
    pub fn secondary_touch(&self, threshold: f32) -> bool {
        self.relative_distance(&self.middle_tip) < threshold
    }

    /// 親指先端から指定点までの手のひらサイズ比距離
    fn relative_distance(&self, tip: &Point3) -> f32 {
        let palm = self.palm_size();
        if palm <= 0.0 {
            return f32::INFINITY;
        }
        self.thumb_tip.distance(tip) / palm
    }

    /// 手の基準点をピクセル座標で計算
    ///
    /// 手首・人差し指付け根・小指付け根の重心。指先より安定した点になる。
    pub fn reference_point(&self, frame_width: u32, frame_height: u32) -> (i32, i32) {
        let w = frame_width as f32;
        let h = frame_height as f32;
        let cx = (self.wrist.x + self.index_mcp.x + self.pinky_mcp.x) / 3.0 * w;
        let cy = (self.wrist.y + self.index_mcp.y + self.pinky_mcp.y) / 3.0 * h;
        (cx as i32, cy as i32)
    }
}

/// フレーム中央の制御矩形
///
/// フレームの中央50%（両軸とも1/4マージン）を論理スクリーン全体に対応させる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ControlRect {
    /// フレームサイズから中央矩形を作成
    pub fn centered(frame_width: u32, frame_height: u32) -> Self {
        let w = frame_width as i32;
        let h = frame_height as i32;
        Self {
            left: w / 4,
            top: h / 4,
            right: w / 4 * 3,
            bottom: h / 4 * 3,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// 矩形内にクランプしてから論理スクリーン座標へ線形写像
    ///
    /// 矩形外の点は最寄りの辺に吸着する（矩形左の点はscreen_x=0になる）。
    pub fn map_to_screen(
        &self,
        x: i32,
        y: i32,
        screen_width: i32,
        screen_height: i32,
    ) -> (i32, i32) {
        let x = x.clamp(self.left, self.right);
        let y = y.clamp(self.top, self.bottom);

        let sx = (x - self.left) as i64 * screen_width as i64 / self.width().max(1) as i64;
        let sy = (y - self.top) as i64 * screen_height as i64 / self.height().max(1) as i64;
        (sx as i32, sy as i32)
    }
}

/// 単一の手からジェスチャサンプルを導出
///
/// タッチ判定・基準点・座標写像をまとめた便宜関数。
pub fn classify_hand(
    hand: &HandLandmarks,
    frame_width: u32,
    frame_height: u32,
    touch_threshold: f32,
    screen_width: i32,
    screen_height: i32,
) -> GestureSample {
    let primary = hand.primary_touch(touch_threshold);
    let secondary = hand.secondary_touch(touch_threshold);
    let (hx, hy) = hand.reference_point(frame_width, frame_height);
    let rect = ControlRect::centered(frame_width, frame_height);
    let (sx, sy) = rect.map_to_screen(hx, hy, screen_width, screen_height);
    GestureSample::active(sx, sy, primary, secondary)
}
