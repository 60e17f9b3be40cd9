use std::sync::Arc;

use anyhow::Context;
use comms::{
    command::UserCommand,
    event::{Event, Participant},
};
use tokio::sync::mpsc;

use crate::room_manager::{ParticipantHandle, RoomManager};

/// [CodeSession] is the server side of a single connection. It joins at most
/// one room and relays the connection's document text into it.
pub(super) struct CodeSession {
    socket_id: String,
    room_manager: Arc<RoomManager>,
    joined_room: Option<ParticipantHandle>,
    outbox_tx: mpsc::UnboundedSender<Event>,
    outbox_rx: mpsc::UnboundedReceiver<Event>,
}

impl CodeSession {
    pub fn new(socket_id: &str, room_manager: Arc<RoomManager>) -> Self {
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();

        CodeSession {
            socket_id: String::from(socket_id),
            room_manager,
            joined_room: None,
            outbox_tx,
            outbox_rx,
        }
    }

    /// Handle a user command related to the room such as; join, code change, sync code
    pub async fn handle_user_command(&mut self, cmd: UserCommand) -> anyhow::Result<()> {
        match cmd {
            UserCommand::Join(cmd) => {
                if let Some(handle) = self.joined_room.as_ref() {
                    return Err(anyhow::anyhow!(
                        "already joined room '{}'",
                        handle.room_id()
                    ));
                }

                let participant = Participant {
                    socket_id: self.socket_id.clone(),
                    username: cmd.username,
                };
                let handle = self
                    .room_manager
                    .join_room(&cmd.room_id, participant, self.outbox_tx.clone())
                    .await?;

                tracing::info!(
                    socket_id = handle.socket_id(),
                    username = handle.username(),
                    room_id = handle.room_id(),
                    "joined room"
                );

                self.joined_room = Some(handle);
            }
            UserCommand::CodeChange(cmd) => match self.joined_room.as_ref() {
                Some(handle) if handle.room_id() == cmd.room_id => {
                    handle.relay_code_change(cmd.code).await;
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "code change for room '{}' which was not joined",
                        cmd.room_id
                    ))
                }
            },
            UserCommand::SyncCode(cmd) => {
                let handle = self
                    .joined_room
                    .as_ref()
                    .context("can not sync code before joining a room")?;

                if !handle.sync_code(cmd.socket_id.as_deref(), cmd.code).await {
                    tracing::debug!(
                        socket_id = handle.socket_id(),
                        target = cmd.socket_id.as_deref(),
                        "sync target is not in the room"
                    );
                }
            }
            UserCommand::Quit(_) => {}
        }

        Ok(())
    }

    /// Leave the room the connection is in, if any, notifying the remaining participants
    pub async fn leave_room(&mut self) -> anyhow::Result<()> {
        if let Some(handle) = self.joined_room.take() {
            tracing::info!(
                socket_id = handle.socket_id(),
                room_id = handle.room_id(),
                "left room"
            );

            self.room_manager.drop_participant_handle(handle).await?;
        }

        Ok(())
    }

    /// Receive an event that was addressed to this connection by its room
    pub async fn recv(&mut self) -> anyhow::Result<Event> {
        self.outbox_rx
            .recv()
            .await
            .context("could not recv from the outbox channel")
    }
}
