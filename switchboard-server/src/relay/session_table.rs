use std::collections::HashMap;
use switchboard_core::{ConnectionId, RoomId, Session, SessionStatus};

/// Partial update applied by [`SessionTable::update`]. `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct SessionUpdate {
    pub room_id: Option<Option<RoomId>>,
    pub status: Option<SessionStatus>,
}

impl SessionUpdate {
    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn joined(room_id: RoomId) -> Self {
        Self {
            room_id: Some(Some(room_id)),
            status: Some(SessionStatus::Signaling),
        }
    }

    pub fn left() -> Self {
        Self {
            room_id: Some(None),
            status: Some(SessionStatus::Left),
        }
    }
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    session: Session,
}

/// Live connections keyed by connection id. Owned by the relay task alone; everyone
/// else sees copies.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<ConnectionId, Entry>,
    next_seq: u64,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh `Connected` session, replacing any record with the same id.
    pub fn create(&mut self, connection_id: ConnectionId, user_id: &str, email: &str) -> Session {
        let session = Session::new(connection_id, user_id.to_owned(), email.to_owned());
        let seq = self.next_seq;
        self.next_seq += 1;
        self.sessions.insert(
            connection_id,
            Entry {
                seq,
                session: session.clone(),
            },
        );
        session
    }

    pub fn update(&mut self, connection_id: &ConnectionId, update: SessionUpdate) -> Option<Session> {
        let session = &mut self.sessions.get_mut(connection_id)?.session;
        if let Some(room_id) = update.room_id {
            session.room_id = room_id;
        }
        if let Some(status) = update.status {
            session.status = status;
        }
        Some(session.clone())
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        self.sessions.remove(connection_id).map(|e| e.session)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(connection_id).map(|e| &e.session)
    }

    /// Point-in-time copy in registration order.
    pub fn list_all(&self) -> Vec<Session> {
        let mut entries: Vec<&Entry> = self.sessions.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.session.clone()).collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
