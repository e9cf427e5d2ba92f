//! Connection hub
//!
//! ルームに属する開いているトランスポートを、コーディネーターとは独立に保持します。
//! コーディネーターが破棄されてもここに残るため、再水和の情報源になります。
//! キープアライブの自動応答もここで処理し、コーディネーターを起こしません。

use std::sync::{Arc, RwLock};

use crate::domain::{AutoResponse, ConnectionKey, Transport, TransportHost};

/// Open transports of one room, in acceptance order
#[derive(Default)]
pub struct ConnectionHub {
    transports: RwLock<Vec<Arc<dyn Transport>>>,
    auto_response: RwLock<Option<AutoResponse>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a newly accepted transport.
    pub fn accept(&self, transport: Arc<dyn Transport>) {
        match self.transports.write() {
            Ok(mut transports) => {
                if !transports.iter().any(|t| t.key() == transport.key()) {
                    transports.push(transport);
                }
            }
            Err(_) => tracing::error!("Connection hub lock poisoned"),
        }
    }

    /// Stop tracking a transport; returns whether it was tracked.
    pub fn release(&self, key: ConnectionKey) -> bool {
        match self.transports.write() {
            Ok(mut transports) => {
                let before = transports.len();
                transports.retain(|t| t.key() != key);
                transports.len() != before
            }
            Err(_) => false,
        }
    }

    /// Reply registered for `payload`, if it is the keep-alive request.
    pub fn auto_reply(&self, payload: &str) -> Option<String> {
        self.auto_response
            .read()
            .ok()?
            .as_ref()
            .and_then(|pair| pair.reply_to(payload))
            .map(str::to_string)
    }

    pub fn open_count(&self) -> usize {
        self.open_transports().len()
    }
}

impl TransportHost for ConnectionHub {
    fn open_transports(&self) -> Vec<Arc<dyn Transport>> {
        self.transports
            .read()
            .map(|transports| {
                transports
                    .iter()
                    .filter(|t| t.is_open())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_auto_response(&self, auto_response: AutoResponse) {
        if let Ok(mut slot) = self.auto_response.write() {
            *slot = Some(auto_response);
        }
    }
}
