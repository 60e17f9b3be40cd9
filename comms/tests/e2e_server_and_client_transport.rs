use comms::{
    command::{self, UserCommand},
    event::{self, Event},
    transport,
};
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::StreamExt;

#[tokio::test]
async fn assert_server_client_transport() {
    // bind to a random free port before the client tries to connect
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind to a port");
    let addr = listener.local_addr().expect("listener has no local address");

    let (server_collected_commands, client_collected_events) =
        tokio::join!(execute_server(listener), execute_client(addr.to_string()));

    assert!(server_collected_commands.is_ok());
    assert!(client_collected_events.is_ok());

    assert_eq!(
        server_collected_commands.unwrap(),
        vec![
            UserCommand::Join(command::JoinCommand {
                room_id: "room-1".into(),
                username: "ada".into(),
            }),
            UserCommand::CodeChange(command::CodeChangeCommand {
                room_id: "room-1".into(),
                code: "fn main() {}\n".into(),
            }),
        ]
    );

    assert_eq!(
        client_collected_events.unwrap(),
        vec![
            Event::Welcome(event::WelcomeReplyEvent {
                socket_id: "socket-1".into(),
            }),
            Event::Joined(event::JoinedBroadcastEvent {
                clients: vec![event::Participant {
                    socket_id: "socket-1".into(),
                    username: "ada".into(),
                }],
                username: "ada".into(),
                socket_id: "socket-1".into(),
            }),
        ]
    );
}

#[tokio::test]
async fn undecodable_line_surfaces_as_an_error() {
    let (client_side, server_side) = tokio::io::duplex(1024);
    let (client_reader, _client_writer) = tokio::io::split(client_side);
    let (_server_reader, mut server_writer) = tokio::io::split(server_side);

    tokio::io::AsyncWriteExt::write_all(&mut server_writer, b"{\"t\":\"no_such_event\"}\r\n")
        .await
        .unwrap();
    drop(server_writer);

    let (mut event_stream, _) = transport::client::split_stream(client_reader, tokio::io::sink());

    assert!(matches!(event_stream.next().await, Some(Err(_))));
}

async fn execute_server(listener: TcpListener) -> anyhow::Result<Vec<command::UserCommand>> {
    // accept the only client connection we will have
    let tcp_stream = match listener.accept().await {
        Ok((tcp_stream, _addr)) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to accept client: {}", e)),
    };

    // break the client connection into higher level API for ease of use
    let (mut command_stream, mut event_writer) = transport::server::split_tcp_stream(tcp_stream);
    // store commands received from the client
    let mut collected_commands = Vec::new();

    // tell the client which connection id it has
    event_writer
        .write(&Event::Welcome(event::WelcomeReplyEvent {
            socket_id: "socket-1".into(),
        }))
        .await?;

    // listen for commands from the client until the connection is closed
    while let Some(result) = command_stream.next().await {
        match result {
            // client has sent a valid command which we could read and parse
            Ok(command) => {
                if let UserCommand::Join(join) = &command {
                    event_writer
                        .write(&Event::Joined(event::JoinedBroadcastEvent {
                            clients: vec![event::Participant {
                                socket_id: "socket-1".into(),
                                username: join.username.clone(),
                            }],
                            username: join.username.clone(),
                            socket_id: "socket-1".into(),
                        }))
                        .await?;
                }

                collected_commands.push(command);
            }
            // client has sent a command which we could not read or parse
            // could be a bug in the client, malicious client, breaking api changes etc.
            Err(e) => return Err(anyhow::anyhow!("failed to read command: {}", e)),
        }
    }

    Ok(collected_commands)
}

async fn execute_client(addr: String) -> anyhow::Result<Vec<event::Event>> {
    // create a client connection to the server
    let tcp_stream = match TcpStream::connect(addr).await {
        Ok(tcp_stream) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to connect to server: {}", e)),
    };

    // break the server connection into higher level API for ease of use
    let (mut event_stream, mut command_writer) = transport::client::split_tcp_stream(tcp_stream);
    // store events received from the server
    let mut collected_events = Vec::new();

    // read the welcome event from the server
    collected_events.push(next_event(&mut event_stream).await?);

    command_writer
        .write(&UserCommand::Join(command::JoinCommand {
            room_id: "room-1".into(),
            username: "ada".into(),
        }))
        .await?;

    // the join is answered with the room roster
    collected_events.push(next_event(&mut event_stream).await?);

    command_writer
        .write(&UserCommand::CodeChange(command::CodeChangeCommand {
            room_id: "room-1".into(),
            code: "fn main() {}\n".into(),
        }))
        .await?;

    Ok(collected_events)
}

async fn next_event(event_stream: &mut transport::client::EventStream) -> anyhow::Result<Event> {
    match event_stream.next().await {
        // server has sent a valid event which we could read and parse
        Some(Ok(event)) => Ok(event),
        // server has sent an event which we could not read or parse
        // could be a bug in the server, malicious server, breaking api changes etc.
        Some(Err(e)) => Err(anyhow::anyhow!("could not parse event: {}", e)),
        // server has closed the connection, return an error
        None => Err(anyhow::anyhow!("server closed the connection")),
    }
}
