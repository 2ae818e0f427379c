//! reqwestによるMJPEG配信の受信アダプタ
//!
//! HTTPレスポンスボディをそのままバイトストリームとして読む。
//! multipartバウンダリの解釈はせず、マーカー走査は上位層が行う。

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::ByteStreamPort;
use std::io::Read;

pub struct HttpStreamAdapter {
    url: String,
    response: Option<reqwest::blocking::Response>,
}

impl HttpStreamAdapter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            response: None,
        }
    }
}

impl ByteStreamPort for HttpStreamAdapter {
    fn connect(&mut self) -> DomainResult<()> {
        let response = reqwest::blocking::Client::new()
            .get(&self.url)
            .send()
            .map_err(|e| DomainError::Stream(format!("request to {} failed: {}", self.url, e)))?
            .error_for_status()
            .map_err(|e| DomainError::Stream(format!("stream rejected: {}", e)))?;

        tracing::info!("connected to video stream at {}", self.url);
        self.response = Some(response);
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> DomainResult<usize> {
        let response = self
            .response
            .as_mut()
            .ok_or_else(|| DomainError::Stream("stream not connected".to_string()))?;

        response
            .read(buf)
            .map_err(|e| DomainError::Stream(format!("stream read failed: {}", e)))
    }
}
