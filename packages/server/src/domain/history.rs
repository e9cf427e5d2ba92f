//! Bounded, insertion-ordered record of recent room messages.

use std::collections::VecDeque;

use super::entity::RoomMessage;

/// Number of messages retained per room.
pub const MAX_HISTORY: usize = 50;

/// 直近のメッセージを保持するリングバッファ
///
/// 追加のみ可能で、容量を超えた分は古い順に捨てられます。
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    messages: VecDeque<RoomMessage>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push to the end, evicting from the front while over capacity.
    pub fn append(&mut self, message: RoomMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// The last `n` entries (or fewer), oldest first.
    pub fn recent(&self, n: usize) -> Vec<RoomMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
