use crate::audit::{AuditEmitter, AuditEvent, AuditKind};
use crate::relay::room_registry::RoomRegistry;
use crate::relay::session_table::{SessionTable, SessionUpdate};
use crate::relay::RelayCommand;
use crate::signaling::SignalingOutput;
use serde_json::json;
use std::sync::Arc;
use switchboard_core::{
    ClientSignal, ConnectionId, MemberInfo, RoomId, ServerSignal, Session, SessionStatus,
    VerifiedIdentity,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The signaling relay. Owns the session table and room membership; every mutation
/// happens on this task, so join/leave broadcasts always see a consistent view.
pub struct Relay {
    sessions: SessionTable,
    rooms: RoomRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    signaling: Arc<dyn SignalingOutput>,
    audit: AuditEmitter,
}

impl Relay {
    pub fn new(
        command_rx: mpsc::Receiver<RelayCommand>,
        signaling: Arc<dyn SignalingOutput>,
        audit: AuditEmitter,
    ) -> Self {
        Self {
            sessions: SessionTable::new(),
            rooms: RoomRegistry::new(),
            command_rx,
            signaling,
            audit,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Register {
                connection_id,
                identity,
            } => self.register(connection_id, identity).await,

            RelayCommand::Signal {
                connection_id,
                signal,
            } => self.handle_signal(connection_id, signal).await,

            RelayCommand::Disconnecting { connection_id } => {
                if self.disconnecting(connection_id).await {
                    self.broadcast_status().await;
                }
            }

            RelayCommand::Disconnected { connection_id } => {
                self.disconnected(connection_id).await;
            }

            RelayCommand::ListSessions { reply } => {
                let _ = reply.send(self.sessions.list_all());
            }

            RelayCommand::GetSession {
                connection_id,
                reply,
            } => {
                let _ = reply.send(self.sessions.get(&connection_id).cloned());
            }
        }
    }

    async fn register(&mut self, connection_id: ConnectionId, identity: VerifiedIdentity) {
        let session = self
            .sessions
            .create(connection_id, &identity.user_id, &identity.email);
        info!(connection_id = %connection_id, user_id = %session.user_id, "Connection registered");

        self.signaling
            .send(&connection_id, &ServerSignal::Welcome { connection_id })
            .await;
        self.broadcast_status().await;

        self.audit.emit(
            AuditEvent::new(AuditKind::Auth, "Socket authenticated")
                .connection(connection_id)
                .user(&identity.user_id, &identity.email),
        );
    }

    async fn handle_signal(&mut self, connection_id: ConnectionId, signal: ClientSignal) {
        let Some(session) = self.sessions.get(&connection_id).cloned() else {
            debug!(connection_id = %connection_id, kind = signal.kind(), "Signal from unregistered connection ignored");
            return;
        };

        match signal {
            ClientSignal::JoinRoom { room_id } => self.join_room(session, room_id).await,

            ClientSignal::LeaveRoom => {
                if self.leave_current_room(&session, "User left room").await {
                    self.sessions.update(&connection_id, SessionUpdate::left());
                    self.broadcast_status().await;
                }
            }

            ClientSignal::StartCall => {
                self.sessions
                    .update(&connection_id, SessionUpdate::status(SessionStatus::InCall));
                self.broadcast_status().await;
            }

            ClientSignal::Offer { to, offer } => {
                let size = offer.get().len();
                let signal = ServerSignal::Offer {
                    offer,
                    from_connection_id: connection_id,
                };
                if self.route_to_peer(&session, to, "offer", &signal).await {
                    self.audit_relay(&session, to, "Relaying offer", json!({ "offerSize": size }));
                }
            }

            ClientSignal::Answer { to, answer } => {
                let size = answer.get().len();
                let signal = ServerSignal::Answer {
                    answer,
                    from_connection_id: connection_id,
                };
                if self.route_to_peer(&session, to, "answer", &signal).await {
                    self.audit_relay(&session, to, "Relaying answer", json!({ "answerSize": size }));
                }
            }

            ClientSignal::IceCandidate { to, candidate } => {
                let signal = ServerSignal::IceCandidate {
                    candidate,
                    from_connection_id: connection_id,
                };
                self.route_to_peer(&session, to, "ice-candidate", &signal)
                    .await;
            }

            ClientSignal::WebrtcStateChange {
                peer_connection_id,
                ice_state,
                signaling_state,
            } => {
                self.audit.emit(
                    AuditEvent::new(
                        AuditKind::WebrtcEvent,
                        format!("Client WebRTC state change for peer {peer_connection_id}"),
                    )
                    .connection(connection_id)
                    .user(&session.user_id, &session.email)
                    .room(session.room_id.as_ref())
                    .peer(peer_connection_id)
                    .webrtc_state(ice_state, signaling_state),
                );
            }

            ClientSignal::ChatMessage { message, timestamp } => {
                let signal = ServerSignal::ChatMessage {
                    user_id: session.user_id.clone(),
                    message,
                    timestamp,
                };
                self.send_to_room(&session, &signal).await;
            }

            ClientSignal::FileMeta { meta } => {
                self.send_to_room(&session, &ServerSignal::FileMeta(meta))
                    .await;
            }

            ClientSignal::EndCall { to } => {
                let signal = ServerSignal::CallEnded {
                    from_connection_id: connection_id,
                };
                let delivered = match to {
                    Some(target) => self.route_to_peer(&session, target, "end-call", &signal).await,
                    None => self.send_to_room(&session, &signal).await,
                };
                if delivered {
                    let target = to.map_or_else(|| "room".to_string(), |t| t.to_string());
                    self.audit.emit(
                        AuditEvent::new(AuditKind::SignalingServer, "Relaying end-call signal")
                            .connection(connection_id)
                            .user(&session.user_id, &session.email)
                            .room(session.room_id.as_ref())
                            .peer(target),
                    );
                }
            }

            ClientSignal::Disconnecting => {
                if self.disconnecting(connection_id).await {
                    self.broadcast_status().await;
                }
            }
        }
    }

    async fn join_room(&mut self, session: Session, room_id: RoomId) {
        let connection_id = session.connection_id;

        if session.room_id.as_ref() == Some(&room_id) {
            debug!(connection_id = %connection_id, room_id = %room_id, "Already in room, resending roster");
            self.send_roster(connection_id, &room_id).await;
            return;
        }

        if session.is_in_room() {
            self.leave_current_room(&session, "User left room (switching rooms)")
                .await;
        }

        let existing = self.rooms.others(&room_id, &connection_id);
        self.rooms.join(&room_id, connection_id);
        self.sessions
            .update(&connection_id, SessionUpdate::joined(room_id.clone()));

        info!(connection_id = %connection_id, room_id = %room_id, members = self.rooms.member_count(&room_id), "User joined room");

        self.signaling
            .send_many(
                &existing,
                &ServerSignal::UserJoined {
                    connection_id,
                    email: session.email.clone(),
                },
            )
            .await;
        self.send_roster(connection_id, &room_id).await;
        self.broadcast_status().await;

        self.audit.emit(
            AuditEvent::new(AuditKind::RoomEvent, "User joined room")
                .connection(connection_id)
                .user(&session.user_id, &session.email)
                .room(Some(&room_id)),
        );
    }

    /// Tells the joiner who is already in the room.
    async fn send_roster(&self, connection_id: ConnectionId, room_id: &RoomId) {
        let members = self
            .rooms
            .others(room_id, &connection_id)
            .into_iter()
            .filter_map(|id| {
                self.sessions.get(&id).map(|s| MemberInfo {
                    connection_id: id,
                    email: s.email.clone(),
                })
            })
            .collect();

        self.signaling
            .send(
                &connection_id,
                &ServerSignal::ExistingMembers {
                    room_id: room_id.clone(),
                    members,
                },
            )
            .await;
    }

    /// Removes the connection from its room and tells the remaining members.
    /// Returns `false` when there was no room to leave.
    async fn leave_current_room(&mut self, session: &Session, reason: &str) -> bool {
        let connection_id = session.connection_id;
        let Some(room_id) = session.room_id.as_ref() else {
            return false;
        };
        if !self.rooms.leave(room_id, &connection_id) {
            return false;
        }

        let remaining = self.rooms.others(room_id, &connection_id);
        self.signaling
            .send_many(&remaining, &ServerSignal::UserLeft { connection_id })
            .await;

        info!(connection_id = %connection_id, room_id = %room_id, remaining = remaining.len(), "{}", reason);
        self.audit.emit(
            AuditEvent::new(AuditKind::RoomEvent, reason)
                .connection(connection_id)
                .user(&session.user_id, &session.email)
                .room(Some(room_id)),
        );
        true
    }

    /// Forwards to `to` only when both ends share a room. Anything else is a silent drop.
    async fn route_to_peer(
        &self,
        sender: &Session,
        to: ConnectionId,
        kind: &'static str,
        signal: &ServerSignal,
    ) -> bool {
        let same_room = sender
            .room_id
            .as_ref()
            .is_some_and(|room| to != sender.connection_id && self.rooms.contains(room, &to));

        if !same_room {
            debug!(from = %sender.connection_id, to = %to, kind, "Target not reachable, dropping");
            self.audit.emit(
                AuditEvent::new(AuditKind::SignalingServer, "Addressing miss, message dropped")
                    .connection(sender.connection_id)
                    .room(sender.room_id.as_ref())
                    .peer(to.to_string())
                    .payload(json!({ "kind": kind })),
            );
            return false;
        }

        self.signaling.send(&to, signal).await;
        true
    }

    /// Sends to every other member of the sender's room. Returns `false` outside a room.
    async fn send_to_room(&self, sender: &Session, signal: &ServerSignal) -> bool {
        let Some(room_id) = sender.room_id.as_ref() else {
            debug!(connection_id = %sender.connection_id, "Room message outside a room ignored");
            return false;
        };
        let others = self.rooms.others(room_id, &sender.connection_id);
        self.signaling.send_many(&others, signal).await;
        true
    }

    fn audit_relay(&self, sender: &Session, to: ConnectionId, message: &str, payload: serde_json::Value) {
        self.audit.emit(
            AuditEvent::new(AuditKind::SignalingServer, message)
                .connection(sender.connection_id)
                .user(&sender.user_id, &sender.email)
                .room(sender.room_id.as_ref())
                .peer(to.to_string())
                .payload(payload),
        );
    }

    /// Leaves the current room ahead of the socket closing. Returns `true` when the
    /// session changed.
    async fn disconnecting(&mut self, connection_id: ConnectionId) -> bool {
        let Some(session) = self.sessions.get(&connection_id).cloned() else {
            return false;
        };
        if !self
            .leave_current_room(&session, "User left room (disconnecting)")
            .await
        {
            return false;
        }
        self.sessions
            .update(&connection_id, SessionUpdate::left())
            .is_some()
    }

    /// Final teardown. Safe to run after `disconnecting` or on its own, any number of times.
    async fn disconnected(&mut self, connection_id: ConnectionId) {
        self.disconnecting(connection_id).await;

        let Some(session) = self.sessions.remove(&connection_id) else {
            return;
        };
        info!(connection_id = %connection_id, user_id = %session.user_id, "User disconnected");
        self.broadcast_status().await;

        self.audit.emit(
            AuditEvent::new(AuditKind::SystemInfo, "User disconnected")
                .connection(connection_id)
                .user(&session.user_id, &session.email),
        );
    }

    async fn broadcast_status(&self) {
        let sessions = self.sessions.list_all();
        self.signaling
            .broadcast(&ServerSignal::StatusUpdate { sessions })
            .await;
    }
}
