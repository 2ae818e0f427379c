//! nokhwaによるローカルカメラアダプタ
//!
//! RGBフォーマットを要求し、取得したバッファをそのままRGB24フレームに
//! 変換する。フォーマット交渉はnokhwaのデコードパスに任せる。

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::CapturePort;
use crate::domain::types::Frame;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};

pub struct NokhwaCameraAdapter {
    camera: Camera,
}

impl NokhwaCameraAdapter {
    /// 指定インデックスのカメラを開き、ストリームを開始する
    pub fn open(index: u32) -> DomainResult<Self> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| DomainError::Capture(format!("failed to open camera {}: {}", index, e)))?;

        camera
            .open_stream()
            .map_err(|e| DomainError::Capture(format!("failed to start camera stream: {}", e)))?;

        let format = camera.camera_format();
        tracing::info!("camera {} opened: {}", index, format);

        Ok(Self { camera })
    }
}

impl CapturePort for NokhwaCameraAdapter {
    fn read_frame(&mut self) -> DomainResult<Option<Frame>> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| DomainError::Capture(format!("camera frame read failed: {}", e)))?;

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| DomainError::Capture(format!("camera frame decode failed: {}", e)))?;

        let width = decoded.width();
        let height = decoded.height();
        Ok(Some(Frame::new(decoded.into_raw(), width, height)))
    }
}
