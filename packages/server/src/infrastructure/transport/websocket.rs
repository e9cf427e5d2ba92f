//! WebSocket を使った Transport 実装
//!
//! ## 責務
//!
//! - WebSocket への書き込みチャンネル（`UnboundedSender`）を保持
//! - コーディネーターが書き込むセッション添付を保持
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は書き込みタスクへのチャンネルだけを持ち、実際のソケット書き込みは
//! UI 層の pusher ループが行います。
//! これにより、「WebSocket の生成」と「メッセージの送信」が分離されます。

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{CloseCode, ConnectionKey, DeliveryError, Transport};

/// Frame handed to the socket writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

/// Transport backed by the writer half of an axum WebSocket
pub struct WebSocketTransport {
    key: ConnectionKey,
    sender: mpsc::UnboundedSender<Outbound>,
    open: AtomicBool,
    attachment: Mutex<Option<String>>,
}

impl WebSocketTransport {
    /// 新しい WebSocketTransport を作成
    ///
    /// # 引数
    ///
    /// - `sender`: pusher ループへのチャンネル
    pub fn new(sender: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            key: ConnectionKey::generate(),
            sender,
            open: AtomicBool::new(true),
            attachment: Mutex::new(None),
        }
    }

    /// Mark the transport closed after the socket itself went away.
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn key(&self) -> ConnectionKey {
        self.key
    }

    async fn send_text(&self, text: String) -> Result<(), DeliveryError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(DeliveryError::Closed);
        }
        self.sender
            .send(Outbound::Text(text))
            .map_err(|e| DeliveryError::WriteFailed(e.to_string()))?;
        tracing::debug!("Pushed frame to connection {}", self.key);
        Ok(())
    }

    fn close(&self, code: CloseCode, reason: &str) {
        if self.open.swap(false, Ordering::SeqCst) {
            // pusher ループが既に終了している場合は送れないが、それで問題ない
            let _ = self.sender.send(Outbound::Close {
                code: code.code(),
                reason: reason.to_string(),
            });
            tracing::debug!("Closing connection {} with {}", self.key, code.code());
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn attachment(&self) -> Option<String> {
        self.attachment.lock().ok().and_then(|slot| slot.clone())
    }

    fn set_attachment(&self, attachment: Option<String>) {
        match self.attachment.lock() {
            Ok(mut slot) => *slot = attachment,
            Err(_) => tracing::error!("Attachment lock poisoned for connection {}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - send_text が pusher ループ向けのチャンネルへ書き込むこと
    // - ループ終了（受信側 drop）後の送信が DeliveryError になること
    // - close が 1 度だけ Close フレームを送ること
    // ========================================

    #[tokio::test]
    async fn test_send_text_success() {
        // テスト項目: 送信したテキストが pusher ループに届く
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = WebSocketTransport::new(tx);

        // when (操作):
        let result = transport.send_text("Hello".to_string()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(Outbound::Text("Hello".to_string())));
    }

    #[tokio::test]
    async fn test_send_after_writer_gone_fails() {
        // テスト項目: pusher ループが終了していると送信は WriteFailed
        // given (前提条件):
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = WebSocketTransport::new(tx);
        drop(rx);

        // when (操作):
        let result = transport.send_text("Hello".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(DeliveryError::WriteFailed(_))));
    }

    #[tokio::test]
    async fn test_close_is_sent_once() {
        // テスト項目: close は 1 度だけ Close フレームを送り、以降の送信は Closed
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = WebSocketTransport::new(tx);

        // when (操作):
        transport.close(CloseCode::Normal, "bye");
        transport.close(CloseCode::GoingAway, "again");
        let after = transport.send_text("late".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            rx.recv().await,
            Some(Outbound::Close {
                code: 1000,
                reason: "bye".to_string()
            })
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(after, Err(DeliveryError::Closed));
        assert!(!transport.is_open());
    }

    #[test]
    fn test_attachment_can_be_set_and_cleared() {
        // テスト項目: 添付の書き込み・読み出し・消去
        // given (前提条件):
        let (tx, _rx) = mpsc::unbounded_channel();
        let transport = WebSocketTransport::new(tx);

        // when (操作) / then (期待する結果):
        assert_eq!(transport.attachment(), None);
        transport.set_attachment(Some("{\"username\":\"alice\"}".to_string()));
        assert_eq!(
            transport.attachment().as_deref(),
            Some("{\"username\":\"alice\"}")
        );
        transport.set_attachment(None);
        assert_eq!(transport.attachment(), None);
    }
}
