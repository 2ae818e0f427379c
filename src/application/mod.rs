//! Application層: パイプラインのユースケース実装
//!
//! ワーカースレッドの起動・停止、最新値セルによる値の受け渡し、
//! ジェスチャ判定からポインタ駆動までのオーケストレーション。

pub mod annotate;
pub mod frame_source;
pub mod latest;
pub mod mjpeg;
pub mod orchestrator;
pub mod pointer_driver;
pub mod presenter;
pub mod stats;
pub mod worker;

pub use frame_source::{FrameSource, RemoteFrameSource};
pub use latest::LatestCell;
pub use mjpeg::JpegStreamScanner;
pub use orchestrator::{FrameFeed, GestureTick, PipelineRunner, RunningPipeline};
pub use pointer_driver::{PointerControl, PointerDriver};
pub use presenter::Presenter;
pub use stats::{StatKind, StatsCollector};
pub use worker::{LifecycleFlag, Tickable, WorkerHandle};
