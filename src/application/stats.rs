//! パイプライン統計の収集と定期レポート
//!
//! ジェスチャワーカーが各tickの所要時間を記録し、一定間隔ごとに
//! 集計をログへ吐き出します。レポートの詳細度はビルドプロファイルで
//! 変わります（開発ビルドはパーセンタイル付き、リリースは要約のみ）。

use std::time::{Duration, Instant};

/// 計測対象の区間種別
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatKind {
    /// 手検出の所要時間
    Detect,
    /// 注釈描画の所要時間
    Annotate,
    /// tick全体（スナップショットから発行まで）
    EndToEnd,
}

impl StatKind {
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    fn label(self) -> &'static str {
        match self {
            StatKind::Detect => "detect",
            StatKind::Annotate => "annotate",
            StatKind::EndToEnd => "tick",
        }
    }
}

/// 区間ごとの所要時間サンプル
#[derive(Debug, Default)]
struct SampleSet {
    durations: Vec<Duration>,
}

impl SampleSet {
    fn record(&mut self, duration: Duration) {
        self.durations.push(duration);
    }

    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    fn summarize(&self) -> Option<(Duration, Duration, Duration)> {
        if self.durations.is_empty() {
            return None;
        }
        let mut sorted = self.durations.clone();
        sorted.sort();
        let avg = sorted.iter().sum::<Duration>() / sorted.len() as u32;
        let p50 = sorted[sorted.len() / 2];
        let p99 = sorted[(sorted.len() * 99 / 100).min(sorted.len() - 1)];
        Some((avg, p50, p99))
    }
}

/// ジェスチャワーカー用の統計コレクタ
pub struct StatsCollector {
    detect: SampleSet,
    annotate: SampleSet,
    end_to_end: SampleSet,
    interval: Duration,
    window_start: Instant,
}

impl StatsCollector {
    pub fn new(interval: Duration) -> Self {
        Self {
            detect: SampleSet::default(),
            annotate: SampleSet::default(),
            end_to_end: SampleSet::default(),
            interval,
            window_start: Instant::now(),
        }
    }

    fn set_mut(&mut self, kind: StatKind) -> &mut SampleSet {
        match kind {
            StatKind::Detect => &mut self.detect,
            StatKind::Annotate => &mut self.annotate,
            StatKind::EndToEnd => &mut self.end_to_end,
        }
    }

    /// 1区間の所要時間を記録
    pub fn record(&mut self, kind: StatKind, duration: Duration) {
        self.set_mut(kind).record(duration);
    }

    /// レポート間隔が経過したか
    pub fn should_report(&self) -> bool {
        self.window_start.elapsed() >= self.interval
    }

    /// 現在ウィンドウの処理フレーム数
    pub fn frames_in_window(&self) -> usize {
        self.end_to_end.durations.len()
    }

    /// 集計をログへ出力し、ウィンドウをリセットする
    pub fn report_and_reset(&mut self) {
        let elapsed = self.window_start.elapsed().as_secs_f64();
        let frames = self.end_to_end.durations.len();
        let fps = if elapsed > 0.0 {
            frames as f64 / elapsed
        } else {
            0.0
        };

        tracing::info!("pipeline stats: {} frames in {:.1}s ({:.1} fps)", frames, elapsed, fps);

        // パーセンタイル詳細は開発ビルドのみ
        #[cfg(debug_assertions)]
        for kind in [StatKind::Detect, StatKind::Annotate, StatKind::EndToEnd] {
            let set = match kind {
                StatKind::Detect => &self.detect,
                StatKind::Annotate => &self.annotate,
                StatKind::EndToEnd => &self.end_to_end,
            };
            if let Some((avg, p50, p99)) = set.summarize() {
                tracing::debug!(
                    "  {}: avg {:.2?} / p50 {:.2?} / p99 {:.2?}",
                    kind.label(),
                    avg,
                    p50,
                    p99
                );
            }
        }
        self.detect.durations.clear();
        self.annotate.durations.clear();
        self.end_to_end.durations.clear();
        self.window_start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_interval_gating() {
        let stats = StatsCollector::new(Duration::from_secs(3600));
        assert!(!stats.should_report());

        let stats = StatsCollector::new(Duration::ZERO);
        assert!(stats.should_report());
    }

    #[test]
    fn test_record_and_reset() {
        let mut stats = StatsCollector::new(Duration::from_secs(10));
        stats.record(StatKind::EndToEnd, Duration::from_millis(5));
        stats.record(StatKind::EndToEnd, Duration::from_millis(7));
        stats.record(StatKind::Detect, Duration::from_millis(3));

        assert_eq!(stats.frames_in_window(), 2);

        stats.report_and_reset();
        assert_eq!(stats.frames_in_window(), 0);
    }

    #[test]
    fn test_summarize_orders_percentiles() {
        let mut set = SampleSet::default();
        for ms in [1u64, 2, 3, 4, 100] {
            set.record(Duration::from_millis(ms));
        }

        let (avg, p50, p99) = set.summarize().expect("samples present");
        assert_eq!(p50, Duration::from_millis(3));
        assert_eq!(p99, Duration::from_millis(100));
        assert!(avg >= p50);
    }

    #[test]
    fn test_empty_set_has_no_summary() {
        let set = SampleSet::default();
        assert!(set.summarize().is_none());
    }
}
