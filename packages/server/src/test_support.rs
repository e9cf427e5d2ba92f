//! Test doubles shared by unit tests across layers.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    AutoResponse, CloseCode, ConnectionKey, DeliveryError, Transport, TransportHost,
};

/// In-memory transport that records every frame it is asked to deliver.
pub struct RecordingTransport {
    key: ConnectionKey,
    sent: Mutex<Vec<String>>,
    open: AtomicBool,
    fail_sends: AtomicBool,
    closed_with: Mutex<Option<u16>>,
    attachment: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            key: ConnectionKey::generate(),
            sent: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
            fail_sends: AtomicBool::new(false),
            closed_with: Mutex::new(None),
            attachment: Mutex::new(None),
        })
    }

    /// Make every subsequent send fail as a broken socket would.
    pub fn break_writes(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Sent frames parsed as JSON (non-JSON frames become `Value::String`).
    pub fn frames(&self) -> Vec<Value> {
        self.sent()
            .into_iter()
            .map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text)))
            .collect()
    }

    /// The `type` field of every sent frame.
    pub fn frame_types(&self) -> Vec<String> {
        self.frames()
            .iter()
            .map(|f| f["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }

    pub fn closed_with(&self) -> Option<u16> {
        self.closed_with.lock().ok().and_then(|c| *c)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn key(&self) -> ConnectionKey {
        self.key
    }

    async fn send_text(&self, text: String) -> Result<(), DeliveryError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(DeliveryError::Closed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DeliveryError::WriteFailed("broken pipe".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text);
        }
        Ok(())
    }

    fn close(&self, code: CloseCode, _reason: &str) {
        if self.open.swap(false, Ordering::SeqCst)
            && let Ok(mut closed_with) = self.closed_with.lock()
        {
            *closed_with = Some(code.code());
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn attachment(&self) -> Option<String> {
        self.attachment.lock().ok().and_then(|a| a.clone())
    }

    fn set_attachment(&self, attachment: Option<String>) {
        if let Ok(mut slot) = self.attachment.lock() {
            *slot = attachment;
        }
    }
}

/// Transport host holding a fixed list of transports.
#[derive(Default)]
pub struct StaticHost {
    transports: Mutex<Vec<Arc<dyn Transport>>>,
    auto_response: Mutex<Option<AutoResponse>>,
}

impl StaticHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, transport: Arc<dyn Transport>) {
        if let Ok(mut transports) = self.transports.lock() {
            transports.push(transport);
        }
    }

    pub fn auto_response(&self) -> Option<AutoResponse> {
        self.auto_response.lock().ok().and_then(|a| a.clone())
    }
}

impl TransportHost for StaticHost {
    fn open_transports(&self) -> Vec<Arc<dyn Transport>> {
        self.transports
            .lock()
            .map(|t| t.iter().filter(|t| t.is_open()).cloned().collect())
            .unwrap_or_default()
    }

    fn set_auto_response(&self, auto_response: AutoResponse) {
        if let Ok(mut slot) = self.auto_response.lock() {
            *slot = Some(auto_response);
        }
    }
}
