use std::collections::{HashMap, HashSet};
use switchboard_core::{ConnectionId, RoomId};

/// Room membership kept by the relay itself. A room exists only while it has members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the connection was already a member.
    pub fn join(&mut self, room_id: &RoomId, connection_id: ConnectionId) -> bool {
        self.rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id)
    }

    /// Returns `false` if the connection was not a member.
    pub fn leave(&mut self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }

    pub fn contains(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    /// Every member of the room except `exclude`.
    pub fn others(&self, room_id: &RoomId, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().filter(|id| *id != exclude).copied().collect())
            .unwrap_or_default()
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, HashSet::len)
    }

    #[cfg(test)]
    fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
