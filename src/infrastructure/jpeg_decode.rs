//! zune-jpegによるフレームデコーダ
//!
//! MJPEGストリームから切り出されたJPEGスパンをRGB24へデコードする。
//! 出力色空間を固定することで下流はピクセル形式を意識しない。

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::FrameDecoderPort;
use crate::domain::types::Frame;
use zune_jpeg::{
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
    JpegDecoder,
};

#[derive(Debug, Default)]
pub struct ZuneJpegDecoder;

impl ZuneJpegDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoderPort for ZuneJpegDecoder {
    fn decode(&mut self, bytes: &[u8]) -> DomainResult<Frame> {
        let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(ZCursor::new(bytes), options);

        let pixels = decoder
            .decode()
            .map_err(|e| DomainError::Decode(format!("JPEG decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| DomainError::Decode("JPEG header missing dimensions".to_string()))?;

        let width = info.width as u32;
        let height = info.height as u32;
        let expected = width as usize * height as usize * Frame::BYTES_PER_PIXEL;
        if pixels.len() < expected {
            return Err(DomainError::Decode(format!(
                "JPEG decode produced too few bytes: got {}, expected {}",
                pixels.len(),
                expected
            )));
        }

        Ok(Frame::new(pixels, width, height))
    }
}
