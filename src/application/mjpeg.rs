//! MJPEGストリームの増分スキャナ
//!
//! 受信チャンクを蓄積バッファに積み、JPEGの開始/終了マーカー
//! （`FFD8` / `FFD9`）で区切られた完全なスパンを順に切り出します。
//! チャンク単位で何度でも呼べる再入可能なパーサで、消費済みバイトは
//! その場で破棄されます。

/// JPEG開始マーカー（SOI）
pub const JPEG_START: [u8; 2] = [0xFF, 0xD8];
/// JPEG終了マーカー（EOI）
pub const JPEG_END: [u8; 2] = [0xFF, 0xD9];

/// マーカー区切りスパンの増分スキャナ
///
/// バッファには上限があり、マーカーが一度も揃わないまま上限を超えた
/// 場合は蓄積分を破棄して警告する（無限成長の防止）。
#[derive(Debug)]
pub struct JpegStreamScanner {
    buffer: Vec<u8>,
    max_buffer_bytes: usize,
}

impl JpegStreamScanner {
    /// バッファ上限を指定してスキャナを作成
    pub fn new(max_buffer_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_buffer_bytes,
        }
    }

    /// 受信チャンクを取り込み、完成したJPEGスパンを順に返す
    ///
    /// 返されるスパンは両マーカーを含む。2スパン分が一度に揃っていれば
    /// 2要素が到着順で返り、2つ目の終了マーカーより後のバイトだけが
    /// バッファに残る。
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let mut spans = Vec::new();
        loop {
            let Some(start) = find_marker(&self.buffer, &JPEG_START) else {
                break;
            };
            let Some(end) = find_marker(&self.buffer[start..], &JPEG_END).map(|i| start + i)
            else {
                break;
            };

            let span_end = end + JPEG_END.len();
            spans.push(self.buffer[start..span_end].to_vec());
            self.buffer.drain(..span_end);
        }

        if self.buffer.len() > self.max_buffer_bytes {
            tracing::warn!(
                "stream buffer exceeded {} bytes without a complete frame, discarding {} bytes",
                self.max_buffer_bytes,
                self.buffer.len()
            );
            self.buffer.clear();
        }

        spans
    }

    /// 現在バッファに残っているバイト数
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

/// 2バイトマーカーの最初の出現位置を探す
fn find_marker(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == marker)
}
