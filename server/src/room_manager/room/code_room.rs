use comms::event::{self, Event, Participant};
use tokio::sync::mpsc;

use super::participant_registry::ParticipantRegistry;

#[derive(Debug, Default)]
/// [CodeRoom] handles the participants of a room and fans events out to them.
///
/// The room does not hold the document; text is only ever forwarded between members.
pub struct CodeRoom {
    registry: ParticipantRegistry,
}

impl CodeRoom {
    pub fn new() -> Self {
        CodeRoom {
            registry: ParticipantRegistry::new(),
        }
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.registry.participants()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Add a participant to the room and tell every member, the newcomer included, about it
    ///
    /// Returns false, without notifying anyone, if the connection was already a member
    pub fn join(&mut self, participant: Participant, outbox: mpsc::UnboundedSender<Event>) -> bool {
        let joined = event::JoinedBroadcastEvent {
            clients: Vec::new(),
            username: participant.username.clone(),
            socket_id: participant.socket_id.clone(),
        };

        if !self.registry.insert(participant, outbox) {
            return false;
        }

        let event = Event::Joined(event::JoinedBroadcastEvent {
            clients: self.registry.participants(),
            ..joined
        });
        self.registry.send_to_all(&event, None);

        true
    }

    /// Remove a participant from the room and tell the remaining members that they left
    pub fn leave(&mut self, socket_id: &str) -> Option<Participant> {
        let participant = self.registry.remove(socket_id)?;

        self.registry.send_to_all(
            &Event::Disconnected(event::DisconnectedBroadcastEvent {
                socket_id: participant.socket_id.clone(),
                username: participant.username.clone(),
            }),
            None,
        );

        Some(participant)
    }

    /// Hand the document text to every member except the sender
    pub fn broadcast_code(&self, from_socket_id: &str, code: Option<String>) {
        self.registry.send_to_all(
            &Event::CodeChange(event::CodeChangeEvent { code }),
            Some(from_socket_id),
        );
    }

    /// Hand the document text to a single member
    pub fn send_code_to(&self, socket_id: &str, code: Option<String>) -> bool {
        self.registry
            .send_to(socket_id, Event::CodeChange(event::CodeChangeEvent { code }))
    }
}
