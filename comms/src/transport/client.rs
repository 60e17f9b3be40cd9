use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{tcp::OwnedWriteHalf, TcpStream},
};

use crate::{command, event};

use super::common::{json_lines, BoxedStream, JsonLineWriter};

/// [EventStream] is a stream of [crate::event::Event]s sent by the server
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select]
/// without the risk of missing events.
pub type EventStream = BoxedStream<anyhow::Result<event::Event>>;

/// [CommandWriter] writes [crate::command::UserCommand]s to the server
pub struct CommandWriter<W = OwnedWriteHalf> {
    writer: JsonLineWriter<W>,
}

impl<W: AsyncWrite + Unpin> CommandWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: JsonLineWriter::new(writer),
        }
    }

    /// Send a [crate::command::UserCommand] to the backing stream
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, then the provided [crate::command::UserCommand] may have been
    /// partially written, but future calls to `write` will start over
    /// from the beginning of the buffer. Causing undefined behaviour.
    pub async fn write(&mut self, command: &command::UserCommand) -> anyhow::Result<()> {
        self.writer.write(command).await
    }
}

/// Splits a TCP stream into a stream of events and a command writer.
///
/// # Arguments
///
/// - `stream` - A [TcpStream] to split
pub fn split_tcp_stream(stream: TcpStream) -> (EventStream, CommandWriter) {
    let (reader, writer) = stream.into_split();

    split_stream(reader, writer)
}

/// Same as [split_tcp_stream] for an already split pair of halves, e.g. an in-memory duplex.
pub fn split_stream<R, W>(reader: R, writer: W) -> (EventStream, CommandWriter<W>)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    (json_lines(reader, "server"), CommandWriter::new(writer))
}
