use std::sync::Arc;

use comms::event::Participant;
use tokio::sync::Mutex;

use super::CodeRoom;

#[derive(Debug)]
/// [ParticipantHandle] is a handle that allows a specific connection to
/// relay document text within the room it has joined.
///
/// It is created when a connection joins a room and is handed out to its session.
pub struct ParticipantHandle {
    /// The id of the room which is associated with this handle
    room_id: String,
    /// The room itself, so relaying does not need to go through the room manager
    room: Arc<Mutex<CodeRoom>>,
    /// The connection and username associated with this handle
    participant: Participant,
}

impl ParticipantHandle {
    pub(in crate::room_manager) fn new(
        room_id: String,
        room: Arc<Mutex<CodeRoom>>,
        participant: Participant,
    ) -> Self {
        ParticipantHandle {
            room_id,
            room,
            participant,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn socket_id(&self) -> &str {
        &self.participant.socket_id
    }

    pub fn username(&self) -> &str {
        &self.participant.username
    }

    /// Relay an edit to every other member of the room
    pub async fn relay_code_change(&self, code: String) {
        let room = self.room.lock().await;

        room.broadcast_code(self.socket_id(), Some(code));
    }

    /// Push the document text to a single member of the room.
    ///
    /// A missing target, or the sender itself as target, hands the text to
    /// every other member instead. Returns false if the target is not in the room.
    pub async fn sync_code(&self, target: Option<&str>, code: Option<String>) -> bool {
        let room = self.room.lock().await;

        match target {
            Some(target) if target != self.socket_id() => room.send_code_to(target, code),
            _ => {
                room.broadcast_code(self.socket_id(), code);
                true
            }
        }
    }
}
