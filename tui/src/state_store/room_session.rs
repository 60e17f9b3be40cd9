use anyhow::Context;
use comms::{
    command::{self, UserCommand},
    event::Event,
    transport::{
        self,
        client::{CommandWriter, EventStream},
    },
};
use tokio::{io::AsyncWrite, net::TcpStream};
use tokio_stream::StreamExt;

/// [RoomSession] is the connection to the relay for the room currently open.
///
/// It exists from the moment the room is entered until the editor page is left,
/// dropping it closes the connection.
pub struct RoomSession<W = tokio::net::tcp::OwnedWriteHalf> {
    room_id: String,
    events: EventStream,
    commands: CommandWriter<W>,
}

impl RoomSession {
    /// Connects to the relay and joins the room
    pub async fn connect(addr: &str, room_id: &str, username: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("could not connect to {}", addr))?;
        let (events, commands) = transport::client::split_tcp_stream(stream);

        RoomSession::join(events, commands, room_id, username).await
    }
}

impl<W: AsyncWrite + Unpin> RoomSession<W> {
    /// Announces the join over an established transport
    pub async fn join(
        events: EventStream,
        mut commands: CommandWriter<W>,
        room_id: &str,
        username: &str,
    ) -> anyhow::Result<Self> {
        commands
            .write(&UserCommand::Join(command::JoinCommand {
                room_id: String::from(room_id),
                username: String::from(username),
            }))
            .await
            .context("could not join room")?;

        tracing::info!(room_id, username, "join requested");

        Ok(RoomSession {
            room_id: String::from(room_id),
            events,
            commands,
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub async fn send(&mut self, command: &UserCommand) -> anyhow::Result<()> {
        self.commands
            .write(command)
            .await
            .context("could not send command to the server")
    }

    /// Next event from the server. An error, or the end of the stream, means the connection is gone
    ///
    /// # Cancel Safety
    ///
    /// This method is cancel-safe, it can be raced in [tokio::select!].
    pub async fn next_event(&mut self) -> anyhow::Result<Event> {
        match self.events.next().await {
            Some(event) => event,
            None => Err(anyhow::anyhow!("server closed the connection")),
        }
    }

    /// Leaves the room. The server is told first, then the connection is dropped
    pub async fn close(mut self) {
        if let Err(err) = self.send(&UserCommand::Quit(command::QuitCommand)).await {
            tracing::debug!(error = %err, "could not say goodbye to the server");
        }

        tracing::info!(room_id = %self.room_id, "left room");
    }
}

#[cfg(test)]
mod tests {
    use comms::{event::WelcomeReplyEvent, transport::server};
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn joining_sends_exactly_one_join_command() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let (client_reader, client_writer) = tokio::io::split(client_side);
        let (server_reader, server_writer) = tokio::io::split(server_side);
        let (events, commands) = transport::client::split_stream(client_reader, client_writer);
        let (mut received, _) = server::split_stream(server_reader, server_writer);

        let session = RoomSession::join(events, commands, "room-1", "ada")
            .await
            .unwrap();
        assert_eq!(session.room_id(), "room-1");
        session.close().await;

        let mut commands = Vec::new();
        while let Some(Ok(cmd)) = received.next().await {
            let quit = cmd == UserCommand::Quit(command::QuitCommand);
            commands.push(cmd);
            if quit {
                break;
            }
        }

        assert_eq!(
            commands,
            vec![
                UserCommand::Join(command::JoinCommand {
                    room_id: "room-1".into(),
                    username: "ada".into(),
                }),
                UserCommand::Quit(command::QuitCommand),
            ]
        );
    }

    #[tokio::test]
    async fn closed_or_broken_streams_are_errors() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let (client_reader, client_writer) = tokio::io::split(client_side);
        let (events, commands) = transport::client::split_stream(client_reader, client_writer);
        let mut session = RoomSession::join(events, commands, "room-1", "ada")
            .await
            .unwrap();

        let (_server_reader, mut server_writer) = tokio::io::split(server_side);
        let welcome = serde_json::to_string(&Event::Welcome(WelcomeReplyEvent {
            socket_id: "s1".into(),
        }))
        .unwrap();
        server_writer
            .write_all(format!("{}\r\nnot json\r\n", welcome).as_bytes())
            .await
            .unwrap();

        assert!(matches!(
            session.next_event().await,
            Ok(Event::Welcome(_))
        ));
        assert!(session.next_event().await.is_err());
    }
}
