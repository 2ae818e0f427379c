//! Infrastructure層: 外部技術の統合
//!
//! Domain層のtraitを実装し、外部ライブラリ（nokhwa/reqwest/zune-jpeg/
//! enigo/minifb）と接続する。実デバイスに触れるアダプタはfeatureで
//! 切り離せる。

pub mod http_stream;
pub mod jpeg_decode;
pub mod mocks;

// カメラアダプタ（camera-nokhwa feature有効時のみ）
#[cfg(feature = "camera-nokhwa")]
pub mod camera;

// ポインタアダプタ（pointer-enigo feature有効時のみ）
#[cfg(feature = "pointer-enigo")]
pub mod pointer;

// 表示アダプタ（display-minifb feature有効時のみ）
#[cfg(feature = "display-minifb")]
pub mod display;
