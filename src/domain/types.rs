/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// すべての処理で共有される不変の型。

use std::time::Instant;

/// キャプチャされたフレームデータ
///
/// 毎tickで丸ごと差し替えられるスナップショット。
/// ワーカー間ではコピーのみが渡され、参照共有はしない。
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（RGB24形式、連続メモリ）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 1ピクセルあたりのバイト数（RGB24）
    pub const BYTES_PER_PIXEL: usize = 3;

    /// 新しいフレームを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }

    /// ピクセルデータ長が width/height と一致しているか
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

/// マウスボタンの種別
///
/// primary = 親指-人差し指タッチ、secondary = 親指-中指タッチに対応。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// 左ボタン
    Primary,
    /// 右ボタン
    Secondary,
}

/// 1tick分のジェスチャ判定結果
///
/// `screen_target`がNoneの場合「このtickでは単一の手が検出されなかった」
/// ことを意味し、ポインタ制御を無効化する。
/// 不変条件: 1サンプルに載るのは高々1つの手のデータのみ。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    /// 論理スクリーン座標への写像結果
    pub screen_target: Option<(i32, i32)>,
    /// 親指-人差し指タッチ（瞬時値、デバウンス前）
    pub primary_touch: bool,
    /// 親指-中指タッチ（瞬時値、デバウンス前）
    pub secondary_touch: bool,
}

impl GestureSample {
    /// 手が検出されなかったtickのサンプルを作成
    pub fn absent() -> Self {
        Self {
            screen_target: None,
            primary_touch: false,
            secondary_touch: false,
        }
    }

    /// 単一の手から得られたサンプルを作成
    pub fn active(x: i32, y: i32, primary_touch: bool, secondary_touch: bool) -> Self {
        Self {
            screen_target: Some((x, y)),
            primary_touch,
            secondary_touch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_well_formed() {
        let frame = Frame::new(vec![0u8; 4 * 2 * 3], 4, 2);
        assert!(frame.is_well_formed());

        let broken = Frame::new(vec![0u8; 5], 4, 2);
        assert!(!broken.is_well_formed());
    }

    #[test]
    fn test_gesture_sample_absent() {
        let sample = GestureSample::absent();
        assert!(sample.screen_target.is_none());
        assert!(!sample.primary_touch);
        assert!(!sample.secondary_touch);
    }

    #[test]
    fn test_gesture_sample_active() {
        let sample = GestureSample::active(960, 540, true, false);
        assert_eq!(sample.screen_target, Some((960, 540)));
        assert!(sample.primary_touch);
        assert!(!sample.secondary_touch);
    }
}
