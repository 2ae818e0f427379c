//! 最新値セル
//!
//! ワーカー間共有のための単一スロット・last-write-wins セル。
//! キューではないため、遅い消費者は中間値を黙って読み飛ばし、
//! 速い消費者は同じ値を複数回読むことがある（意図した有界ステールネス）。

use std::sync::Mutex;

/// ロック1本で守られた最新値スロット
///
/// クリティカルセクションはコピーの出し入れのみで、
/// ロックを保持したままI/Oや計算は行わない。
/// 読み手は常に独立したコピーを受け取り、参照は境界を越えない。
#[derive(Debug, Default)]
pub struct LatestCell<T> {
    slot: Mutex<Option<T>>,
}

impl<T: Clone> LatestCell<T> {
    /// 空のセルを作成
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// 値を丸ごと差し替える（last-write-wins）
    pub fn publish(&self, value: T) {
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            // 書き手がパニックした場合も最新値の差し替えは安全
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(value);
    }

    /// 最新値のコピーを取得（まだ何も書かれていなければNone）
    pub fn snapshot(&self) -> Option<T> {
        let guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }
}
