use std::{collections::HashMap, sync::Arc};

use comms::event::{Event, Participant};
use tokio::sync::{mpsc, Mutex};

use super::room::{CodeRoom, ParticipantHandle};

/// [RoomManager] owns every live room. Rooms are created by the first join
/// and dropped once their last participant leaves.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: Mutex<HashMap<String, Arc<Mutex<CodeRoom>>>>,
}

impl RoomManager {
    pub fn new() -> RoomManager {
        RoomManager {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Joins a room with the given participant, events for the participant are delivered to `outbox`
    pub async fn join_room(
        &self,
        room_id: &str,
        participant: Participant,
        outbox: mpsc::UnboundedSender<Event>,
    ) -> anyhow::Result<ParticipantHandle> {
        // the map stays locked until the join is done, so a concurrent leave can not drop the room under us
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(String::from(room_id))
            .or_insert_with(|| {
                tracing::info!(room_id, "room created");
                Arc::new(Mutex::new(CodeRoom::new()))
            })
            .clone();

        if !room.lock().await.join(participant.clone(), outbox) {
            return Err(anyhow::anyhow!(
                "connection '{}' is already in room '{}'",
                participant.socket_id,
                room_id
            ));
        }

        Ok(ParticipantHandle::new(
            String::from(room_id),
            room,
            participant,
        ))
    }

    /// Removes the participant from its room, dropping the room if nobody is left
    pub async fn drop_participant_handle(&self, handle: ParticipantHandle) -> anyhow::Result<()> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get(handle.room_id())
            .ok_or_else(|| anyhow::anyhow!("room '{}' not found", handle.room_id()))?
            .clone();

        let mut room = room.lock().await;
        room.leave(handle.socket_id());

        if room.is_empty() {
            rooms.remove(handle.room_id());
            tracing::info!(room_id = handle.room_id(), "room closed");
        }

        Ok(())
    }

    /// Participants of a room in join order, empty if the room does not exist
    pub async fn participants(&self, room_id: &str) -> Vec<Participant> {
        let room = match self.rooms.lock().await.get(room_id) {
            Some(room) => room.clone(),
            None => return Vec::new(),
        };

        let participants = room.lock().await.participants();
        participants
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}
