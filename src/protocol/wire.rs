//! Message framing: one JSON document per line.

use crate::error::{Channel, ChannelError, ChannelOp};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{instrument, trace};

/// Upper bound on one action message, newline excluded.
pub const MAX_ACTION_BYTES: usize = 1024;

/// Upper bound used by agents reading state and result messages.
pub const MAX_STATE_BYTES: usize = 64 * 1024;

/// Writes newline-terminated JSON messages to one channel.
#[derive(Debug)]
pub struct MessageWriter<W> {
    channel: Channel,
    inner: W,
}

impl<W: AsyncWrite + Unpin + Send> MessageWriter<W> {
    /// Wraps a byte stream.
    pub fn new(channel: Channel, inner: W) -> Self {
        Self { channel, inner }
    }

    /// The channel this writer serves.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Serializes and flushes one message.
    #[instrument(skip(self, message), fields(channel = %self.channel))]
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), ChannelError> {
        let mut bytes = serde_json::to_vec(message)
            .map_err(|e| ChannelError::new(self.channel, ChannelOp::Encode, e.to_string()))?;
        bytes.push(b'\n');

        self.inner
            .write_all(&bytes)
            .await
            .map_err(|e| ChannelError::io(self.channel, ChannelOp::Write, e))?;
        self.inner
            .flush()
            .await
            .map_err(|e| ChannelError::io(self.channel, ChannelOp::Write, e))?;

        trace!(bytes = bytes.len(), "Message sent");
        Ok(())
    }

    /// Shuts down the write half so the peer sees end of stream.
    #[instrument(skip(self), fields(channel = %self.channel))]
    pub async fn close(&mut self) -> Result<(), ChannelError> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| ChannelError::io(self.channel, ChannelOp::Close, e))
    }
}

/// Reads newline-terminated JSON messages from one channel.
#[derive(Debug)]
pub struct MessageReader<R> {
    channel: Channel,
    inner: BufReader<R>,
    limit: usize,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> MessageReader<R> {
    /// Wraps a byte stream; messages longer than `limit` bytes are refused.
    pub fn new(channel: Channel, inner: R, limit: usize) -> Self {
        Self {
            channel,
            inner: BufReader::new(inner),
            limit,
            buf: Vec::with_capacity(limit.min(MAX_ACTION_BYTES) + 1),
        }
    }

    /// The channel this reader serves.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Blocks until one complete message arrives.
    ///
    /// Returns `Ok(None)` if the peer closed the stream between messages.
    /// Blank lines are skipped.
    #[instrument(skip(self), fields(channel = %self.channel))]
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<Option<T>, ChannelError> {
        loop {
            self.buf.clear();
            let read = (&mut self.inner)
                .take(self.limit as u64 + 1)
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|e| ChannelError::io(self.channel, ChannelOp::Read, e))?;

            if read == 0 {
                trace!("Peer closed the stream");
                return Ok(None);
            }

            let terminated = self.buf.last() == Some(&b'\n');
            if !terminated && read > self.limit {
                return Err(ChannelError::new(
                    self.channel,
                    ChannelOp::Read,
                    format!("message exceeds {} bytes", self.limit),
                ));
            }

            let text = self.buf.trim_ascii();
            if text.is_empty() {
                continue;
            }

            trace!(bytes = text.len(), "Message received");
            return serde_json::from_slice(text)
                .map(Some)
                .map_err(|e| ChannelError::new(self.channel, ChannelOp::Decode, e.to_string()));
        }
    }
}
