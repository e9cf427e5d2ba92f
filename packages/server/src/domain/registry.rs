//! Session registry
//!
//! ライブな接続（トランスポート）と、その接続に紐づくセッションの対応表。
//! コーディネーターだけが変更します。
//!
//! エントリは `ConnectionKey` をキーとするアリーナ形式で保持し、
//! クローズ・送信失敗のすべての経路で明示的に削除されます。

use std::{collections::HashMap, sync::Arc};

use super::{
    entity::Session,
    error::JoinError,
    transport::Transport,
    value_object::{ConnectionKey, DisplayName, Timestamp},
};

/// Lifecycle state of one connection as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport open, no session yet
    Connected,
    /// Session present
    Joined,
    /// Entry removed (or never registered)
    Closed,
}

struct Entry {
    transport: Arc<dyn Transport>,
    session: Option<Session>,
}

/// What remains of a connection once it has been removed from the registry.
pub struct Departure {
    pub transport: Arc<dyn Transport>,
    pub session: Option<Session>,
}

/// Authoritative mapping of live connection → session state.
#[derive(Default)]
pub struct SessionRegistry {
    entries: HashMap<ConnectionKey, Entry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connected-but-not-joined transport.
    ///
    /// Returns `false` (and changes nothing) if the key is already registered.
    pub fn register(&mut self, transport: Arc<dyn Transport>) -> bool {
        let key = transport.key();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(
            key,
            Entry {
                transport,
                session: None,
            },
        );
        true
    }

    /// Create a session for a registered connection.
    ///
    /// The name is trimmed before validation. Fails with `DuplicateName` when another
    /// live connection already holds exactly the same name.
    pub fn join(
        &mut self,
        key: ConnectionKey,
        display_name: &str,
        joined_at: Timestamp,
    ) -> Result<Session, JoinError> {
        let entry = self
            .entries
            .get(&key)
            .ok_or(JoinError::UnknownConnection)?;
        if entry.session.is_some() {
            return Err(JoinError::AlreadyJoined);
        }

        let display_name =
            DisplayName::new(display_name.to_string()).map_err(JoinError::InvalidName)?;
        if self.is_name_taken(&display_name) {
            return Err(JoinError::DuplicateName(display_name));
        }

        let session = Session::new(display_name, joined_at);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.session = Some(session.clone());
        }
        Ok(session)
    }

    /// Re-insert a transport together with a session recovered from its attachment.
    pub fn restore(
        &mut self,
        transport: Arc<dyn Transport>,
        session: Session,
    ) -> Result<(), JoinError> {
        let key = transport.key();
        if self.entries.contains_key(&key) {
            return Err(JoinError::AlreadyJoined);
        }
        if self.is_name_taken(&session.display_name) {
            return Err(JoinError::DuplicateName(session.display_name));
        }
        self.entries.insert(
            key,
            Entry {
                transport,
                session: Some(session),
            },
        );
        Ok(())
    }

    /// Remove the connection entirely.
    ///
    /// Returns `None` on every call after the first for the same key.
    pub fn remove(&mut self, key: ConnectionKey) -> Option<Departure> {
        self.entries.remove(&key).map(|entry| Departure {
            transport: entry.transport,
            session: entry.session,
        })
    }

    /// Remove the connection and return its session, if it had joined.
    pub fn leave(&mut self, key: ConnectionKey) -> Option<Session> {
        self.remove(key).and_then(|departure| departure.session)
    }

    pub fn session_of(&self, key: ConnectionKey) -> Option<&Session> {
        self.entries
            .get(&key)
            .and_then(|entry| entry.session.as_ref())
    }

    pub fn transport_of(&self, key: ConnectionKey) -> Option<Arc<dyn Transport>> {
        self.entries
            .get(&key)
            .map(|entry| Arc::clone(&entry.transport))
    }

    pub fn state_of(&self, key: ConnectionKey) -> ConnectionState {
        match self.entries.get(&key) {
            Some(Entry {
                session: Some(_), ..
            }) => ConnectionState::Joined,
            Some(Entry { session: None, .. }) => ConnectionState::Connected,
            None => ConnectionState::Closed,
        }
    }

    /// Joined participants only.
    pub fn all(&self) -> impl Iterator<Item = (&Arc<dyn Transport>, &Session)> {
        self.entries.values().filter_map(|entry| {
            entry
                .session
                .as_ref()
                .map(|session| (&entry.transport, session))
        })
    }

    pub fn is_name_taken(&self, display_name: &DisplayName) -> bool {
        self.all()
            .any(|(_, session)| &session.display_name == display_name)
    }

    pub fn joined_count(&self) -> usize {
        self.all().count()
    }

    /// Every registered connection, joined or not.
    pub fn connection_count(&self) -> usize {
        self.entries.len()
    }
}
