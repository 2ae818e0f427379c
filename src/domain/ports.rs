/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層のワーカーに注入される。
/// 各ポートは所有スレッドに移動して排他的に使用されるため、境界はSendのみ。

use crate::domain::{DomainResult, Frame, HandLandmarks, MouseButton};

/// フレーム取得ポート: ローカルカメラ等からの1フレーム読み取りを抽象化
pub trait CapturePort: Send {
    /// フレームを1枚読み取る
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: フレームの取得成功
    /// - `Ok(None)`: 新しいフレームなし（このtickはスキップ）
    /// - `Err(DomainError)`: 読み取り失敗（呼び出し側でログしてスキップ）
    fn read_frame(&mut self) -> DomainResult<Option<Frame>>;
}

/// バイトストリームポート: リモートMJPEG配信のチャンク受信を抽象化
pub trait ByteStreamPort: Send {
    /// ストリームへ接続する（1回のみ呼ばれる）
    ///
    /// 非成功レスポンスはErrで返し、そのソースは以後フレームを産出しない。
    fn connect(&mut self) -> DomainResult<()>;

    /// 次のチャンクを読み取る
    ///
    /// # Returns
    /// - `Ok(0)`: ストリーム終端
    /// - `Ok(n)`: `buf[..n]`に受信データ
    fn read_chunk(&mut self, buf: &mut [u8]) -> DomainResult<usize>;
}

/// フレームデコードポート: JPEGバイト列からフレームへの変換を抽象化
pub trait FrameDecoderPort: Send {
    /// マーカー込みのJPEGバイト列を1フレームへデコードする
    fn decode(&mut self, bytes: &[u8]) -> DomainResult<Frame>;
}

/// 検出ポート: 手ランドマーク検出を抽象化
///
/// 返り値は検出された手ごとのランドマーク集合（0個以上）。
pub trait HandDetectorPort: Send {
    fn detect_hands(&mut self, frame: &Frame) -> DomainResult<Vec<HandLandmarks>>;
}

/// ポインタポート: OSレベルのマウス操作を抽象化
pub trait PointerPort: Send {
    /// 現在のポインタ位置を取得
    fn position(&mut self) -> DomainResult<(i32, i32)>;

    /// 実スクリーンサイズを取得
    fn screen_size(&mut self) -> DomainResult<(i32, i32)>;

    /// ポインタを絶対座標へ移動
    fn move_to(&mut self, x: i32, y: i32) -> DomainResult<()>;

    /// ボタン押下イベントを送出
    fn button_down(&mut self, button: MouseButton) -> DomainResult<()>;

    /// ボタン解放イベントを送出
    fn button_up(&mut self, button: MouseButton) -> DomainResult<()>;
}

/// 表示ポート: アノテーション済みフレームの表示と終了キー検知を抽象化
pub trait DisplayPort: Send {
    /// フレームを表示する
    fn show(&mut self, frame: &Frame) -> DomainResult<()>;

    /// 終了キーが押されたか（表示1回につき1回ポーリング）
    fn poll_quit(&mut self) -> bool;
}
