use std::sync::Arc;

use comms::{
    command::UserCommand,
    event,
    transport::{
        self,
        server::{CommandStream, EventWriter},
    },
};
use nanoid::nanoid;
use tokio::{io::AsyncWrite, net::TcpStream, sync::broadcast};
use tokio_stream::StreamExt;

use crate::room_manager::RoomManager;

use self::code_session::CodeSession;

mod code_session;

/// Given a tcp stream and a room manager, handles the connection
/// until the user quits, or the tcp stream is closed for some reason, or the server shuts down
pub async fn handle_user_session(
    room_manager: Arc<RoomManager>,
    quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
) -> anyhow::Result<()> {
    // Split the tcp stream into a command stream and an event writer with better ergonomics
    let (commands, event_writer) = transport::server::split_tcp_stream(stream);

    run_session(room_manager, quit_rx, commands, event_writer).await
}

/// Drives a single connection over an already split transport
pub async fn run_session<W: AsyncWrite + Unpin>(
    room_manager: Arc<RoomManager>,
    mut quit_rx: broadcast::Receiver<()>,
    mut commands: CommandStream,
    mut event_writer: EventWriter<W>,
) -> anyhow::Result<()> {
    let socket_id = nanoid!();

    // Tell the connection its id, clients use it to address and tag their code pushes
    event_writer
        .write(&event::Event::Welcome(event::WelcomeReplyEvent {
            socket_id: socket_id.clone(),
        }))
        .await?;

    tracing::debug!(socket_id = %socket_id, "connection accepted");

    let mut session = CodeSession::new(&socket_id, room_manager);

    let result = loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // If the user closes the tcp stream, or sends a quit cmd
                // We need to cleanup resources in a way that the other users are notified about the departure
                None | Some(Ok(UserCommand::Quit(_))) => break Ok(()),
                Some(Ok(cmd)) => {
                    if let Err(err) = session.handle_user_command(cmd).await {
                        tracing::warn!(socket_id = %socket_id, error = %err, "rejected command");
                    }
                }
                // A line which can not be read or decoded ends the connection
                Some(Err(err)) => {
                    tracing::warn!(socket_id = %socket_id, error = %err, "dropping connection");
                    break Err(err);
                }
            },
            // Events addressed to this connection are written out in arrival order
            Ok(event) = session.recv() => {
                if let Err(err) = event_writer.write(&event).await {
                    break Err(err);
                }
            }
            // If the server is shutting down, we can just close the tcp streams
            // and exit the session handler. Since the server is shutting down,
            // we don't need to notify other users about the departure
            Ok(_) = quit_rx.recv() => {
                drop(event_writer);
                tracing::debug!(socket_id = %socket_id, "gracefully shutting down connection");
                return Ok(());
            }
        }
    };

    session.leave_room().await?;
    tracing::debug!(socket_id = %socket_id, "connection closed");

    result
}

#[cfg(test)]
mod tests {
    use comms::{
        command::{CodeChangeCommand, JoinCommand, QuitCommand},
        event::{CodeChangeEvent, Event, Participant},
        transport::client::{self, CommandWriter, EventStream},
    };
    use tokio::io::{DuplexStream, WriteHalf};

    use super::*;

    struct TestClient {
        events: EventStream,
        commands: CommandWriter<WriteHalf<DuplexStream>>,
    }

    impl TestClient {
        async fn next(&mut self) -> Event {
            self.events
                .next()
                .await
                .expect("stream closed")
                .expect("bad event")
        }
    }

    // wire a client transport to a session running in the background
    fn connect(
        room_manager: Arc<RoomManager>,
        quit_rx: broadcast::Receiver<()>,
    ) -> (TestClient, tokio::task::JoinHandle<anyhow::Result<()>>) {
        let (client_side, server_side) = tokio::io::duplex(64 * 1024);
        let (server_reader, server_writer) = tokio::io::split(server_side);
        let (client_reader, client_writer) = tokio::io::split(client_side);

        let (commands, event_writer) = transport::server::split_stream(server_reader, server_writer);
        let session = tokio::spawn(run_session(room_manager, quit_rx, commands, event_writer));

        let (events, commands) = client::split_stream(client_reader, client_writer);

        (TestClient { events, commands }, session)
    }

    async fn join(client: &mut TestClient, username: &str) -> String {
        let socket_id = match client.next().await {
            Event::Welcome(welcome) => welcome.socket_id,
            other => panic!("expected welcome, got {:?}", other),
        };

        client
            .commands
            .write(&UserCommand::Join(JoinCommand {
                room_id: "room-1".into(),
                username: username.into(),
            }))
            .await
            .unwrap();

        socket_id
    }

    #[tokio::test]
    async fn relays_edits_and_announces_departures() {
        let room_manager = Arc::new(RoomManager::new());
        let (_quit_tx, quit_rx) = broadcast::channel(1);

        let (mut ada, _) = connect(room_manager.clone(), quit_rx.resubscribe());
        let ada_id = join(&mut ada, "ada").await;
        assert!(matches!(ada.next().await, Event::Joined(_)));

        let (mut grace, grace_session) = connect(room_manager.clone(), quit_rx.resubscribe());
        let grace_id = join(&mut grace, "grace").await;

        let roster = vec![
            Participant {
                socket_id: ada_id.clone(),
                username: "ada".into(),
            },
            Participant {
                socket_id: grace_id.clone(),
                username: "grace".into(),
            },
        ];
        for client in [&mut ada, &mut grace] {
            match client.next().await {
                Event::Joined(joined) => {
                    assert_eq!(joined.clients, roster);
                    assert_eq!(joined.socket_id, grace_id);
                }
                other => panic!("expected joined, got {:?}", other),
            }
        }

        grace
            .commands
            .write(&UserCommand::CodeChange(CodeChangeCommand {
                room_id: "room-1".into(),
                code: "x = 1".into(),
            }))
            .await
            .unwrap();
        assert_eq!(
            ada.next().await,
            Event::CodeChange(CodeChangeEvent {
                code: Some("x = 1".into()),
            })
        );

        grace
            .commands
            .write(&UserCommand::Quit(QuitCommand))
            .await
            .unwrap();
        grace_session.await.unwrap().unwrap();

        match ada.next().await {
            Event::Disconnected(disconnected) => {
                assert_eq!(disconnected.socket_id, grace_id);
                assert_eq!(disconnected.username, "grace");
            }
            other => panic!("expected disconnected, got {:?}", other),
        }
        assert_eq!(room_manager.participants("room-1").await.len(), 1);
    }
}
