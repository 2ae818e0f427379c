//! ワーカーループ基盤
//!
//! 各ワーカーは自分のtickレートで独立に回るスレッドを1本持ち、
//! 協調キャンセル用のライフサイクルフラグを毎イテレーション観測します。
//! `Arc<AtomicBool>`によるロックフリー設計のため、フラグ確認は数CPUサイクルで済みます。

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;
use std::time::Duration;

/// ワーカーのライフサイクルフラグ（スレッド間で共有、ロックフリー）
///
/// start時にtrue、stop時にfalse。各ループは1イテレーションにつき
/// 最低1回これを観測し、falseになったら速やかに抜ける。
///
/// # メモリオーダー
/// Relaxed - 厳密な順序保証は不要（観測が1tick遅れても無害）
#[derive(Clone, Debug)]
pub struct LifecycleFlag {
    active: Arc<AtomicBool>,
}

impl LifecycleFlag {
    /// 非アクティブ状態のフラグを作成
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// ワーカーがまだ動作すべきかを確認（ロックフリー、超高速）
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// ループの開始を許可
    pub fn activate(&self) {
        self.active.store(true, Ordering::Relaxed);
    }

    /// 停止を要求（待機はしない）
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }
}

impl Default for LifecycleFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// tick駆動ワーカーの1ステップ
///
/// ループ本体は`WorkerHandle`が共通実装するテンプレートで、
/// 各ワーカーはstep()だけを実装する。
pub trait Tickable: Send + 'static {
    /// ドメイン固有の1ステップを実行
    fn step(&mut self);

    /// ループ終了後に1回だけ呼ばれる後始末フック
    fn finish(&mut self) {}
}

/// 起動済みワーカーのハンドル
///
/// stop()はフラグを下ろすだけで待機しない。join()はスレッド終了まで
/// ブロックし、stop()の後に別スレッドから呼んでも安全。
pub struct WorkerHandle {
    name: &'static str,
    flag: LifecycleFlag,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// tick駆動ワーカーを起動
    ///
    /// 各イテレーション: フラグ確認 → step() → 1/rate秒スリープ。
    /// ドリフト補正は行わない（ケイデンス精度より単純さを優先する設計）。
    pub fn spawn<T: Tickable>(
        name: &'static str,
        rate_hz: f64,
        flag: LifecycleFlag,
        mut tickable: T,
    ) -> Self {
        flag.activate();
        let period = Duration::from_secs_f64(1.0 / rate_hz);
        let loop_flag = flag.clone();

        let handle = std::thread::spawn(move || {
            tracing::info!("{} worker started ({:.0} ticks/s)", name, rate_hz);

            while loop_flag.is_active() {
                tickable.step();
                std::thread::sleep(period);
            }

            tickable.finish();
            tracing::info!("{} worker stopped", name);
        });

        Self {
            name,
            flag,
            handle: Some(handle),
        }
    }

    /// tickテンプレートを使わないワーカーを起動
    ///
    /// リモートストリームのようにネットワーク到着レートで駆動する
    /// ループ用。フラグの観測はクロージャ側の責任になる。
    pub fn spawn_with<F>(name: &'static str, flag: LifecycleFlag, body: F) -> Self
    where
        F: FnOnce(LifecycleFlag) + Send + 'static,
    {
        flag.activate();
        let loop_flag = flag.clone();

        let handle = std::thread::spawn(move || {
            tracing::info!("{} worker started", name);
            body(loop_flag);
            tracing::info!("{} worker stopped", name);
        });

        Self {
            name,
            flag,
            handle: Some(handle),
        }
    }

    /// このワーカーのライフサイクルフラグ
    pub fn flag(&self) -> LifecycleFlag {
        self.flag.clone()
    }

    /// 停止を要求する（ノンブロッキング）
    pub fn stop(&self) {
        self.flag.deactivate();
    }

    /// スレッドの終了を待つ
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("{} worker panicked", self.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct CountingTick {
        steps: Arc<AtomicU32>,
        finished: Arc<AtomicBool>,
    }

    impl Tickable for CountingTick {
        fn step(&mut self) {
            self.steps.fetch_add(1, Ordering::Relaxed);
        }

        fn finish(&mut self) {
            self.finished.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_lifecycle_flag_transitions() {
        let flag = LifecycleFlag::new();
        assert!(!flag.is_active());

        flag.activate();
        assert!(flag.is_active());

        // cloneは同じ状態を共有する
        let other = flag.clone();
        other.deactivate();
        assert!(!flag.is_active());
    }

    #[test]
    fn test_worker_ticks_until_stopped() {
        let steps = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let tick = CountingTick {
            steps: Arc::clone(&steps),
            finished: Arc::clone(&finished),
        };

        let mut worker = WorkerHandle::spawn("test", 1000.0, LifecycleFlag::new(), tick);

        // 数tick進むまで待つ
        std::thread::sleep(Duration::from_millis(50));
        assert!(worker.flag().is_active());

        worker.stop();
        worker.join();

        assert!(!worker.flag().is_active());
        assert!(steps.load(Ordering::Relaxed) > 0);
        assert!(finished.load(Ordering::Relaxed), "finish hook should run");
    }

    #[test]
    fn test_join_after_stop_from_other_thread() {
        let steps = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let tick = CountingTick {
            steps,
            finished,
        };

        let mut worker = WorkerHandle::spawn("test", 1000.0, LifecycleFlag::new(), tick);
        let flag = worker.flag();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            flag.deactivate();
        });

        worker.join();
        stopper.join().expect("stopper thread");
        assert!(!worker.flag().is_active());
    }

    #[test]
    fn test_spawn_with_observes_flag() {
        let flag = LifecycleFlag::new();
        let mut worker = WorkerHandle::spawn_with("raw", flag, |flag| {
            while flag.is_active() {
                std::thread::sleep(Duration::from_millis(1));
            }
        });

        std::thread::sleep(Duration::from_millis(10));
        worker.stop();
        worker.join();
    }
}
