use std::pin::Pin;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::{wrappers::LinesStream, Stream, StreamExt};

pub const NEW_LINE: &[u8; 2] = b"\r\n";

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Writes values as single JSON lines to the backing writer
pub(super) struct JsonLineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> JsonLineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write<T: Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        let mut serialized_bytes = serde_json::to_vec(value)?;
        serialized_bytes.extend_from_slice(NEW_LINE);

        self.writer.write_all(serialized_bytes.as_slice()).await?;
        self.writer.flush().await?;

        Ok(())
    }
}

/// Turns the reading half of a connection into a stream of decoded JSON lines.
/// `peer` names the other side of the connection in error contexts.
pub(super) fn json_lines<R, T>(reader: R, peer: &'static str) -> BoxedStream<anyhow::Result<T>>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(
        LinesStream::new(BufReader::new(reader).lines()).map(move |line| {
            line.with_context(|| format!("could not read line from the {}", peer))
                .and_then(|line| {
                    serde_json::from_str::<T>(&line)
                        .with_context(|| format!("failed to deserialize line from the {}", peer))
                })
        }),
    )
}
