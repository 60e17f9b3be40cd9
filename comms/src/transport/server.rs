use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{tcp::OwnedWriteHalf, TcpStream},
};

use crate::{command, event};

use super::common::{json_lines, BoxedStream, JsonLineWriter};

/// [CommandStream] is a stream of [crate::command::UserCommand]s sent by the client
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select!]
/// without the risk of missing commands.
pub type CommandStream = BoxedStream<anyhow::Result<command::UserCommand>>;

/// [EventWriter] writes [crate::event::Event]s to the client
pub struct EventWriter<W = OwnedWriteHalf> {
    writer: JsonLineWriter<W>,
}

impl<W: AsyncWrite + Unpin> EventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: JsonLineWriter::new(writer),
        }
    }

    /// Send a [crate::event::Event] to the backing stream
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, then the provided [crate::event::Event] may have been
    /// partially written, but future calls to `write` will start over
    /// from the beginning of the buffer. Causing undefined behaviour.
    pub async fn write(&mut self, event: &event::Event) -> anyhow::Result<()> {
        self.writer.write(event).await
    }
}

/// Splits a TCP stream into a stream of commands and an event writer.
///
/// # Arguments
///
/// - `stream` - A [TcpStream] to split
pub fn split_tcp_stream(stream: TcpStream) -> (CommandStream, EventWriter) {
    let (reader, writer) = stream.into_split();

    split_stream(reader, writer)
}

/// Same as [split_tcp_stream] for an already split pair of halves, e.g. an in-memory duplex.
pub fn split_stream<R, W>(reader: R, writer: W) -> (CommandStream, EventWriter<W>)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    (json_lines(reader, "client"), EventWriter::new(writer))
}
