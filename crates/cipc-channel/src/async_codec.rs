//! Tokio codec for length-prefixed message frames.

use bytes::BytesMut;
use cipc_msg::Message;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE};
use crate::error::{ChannelError, Result};

/// Frames [`Message`]s on an async byte stream.
///
/// Same wire format as the blocking [`FrameReader`](crate::FrameReader) and
/// [`FrameWriter`](crate::FrameWriter), so either side of a connection may
/// be async.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    max_frame_size: usize,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn from_config(config: &FrameConfig) -> Self {
        Self::with_max_frame_size(config.max_frame_size)
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = ChannelError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        let Some(frame) = decode_frame(src, self.max_frame_size)? else {
            return Ok(None);
        };
        let message = Message::from_bytes(frame)?;
        message.validate()?;
        Ok(Some(message))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() => Ok(None),
            None => Err(ChannelError::ConnectionClosed),
        }
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = ChannelError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        <Self as Encoder<&Message>>::encode(self, &item, dst)
    }
}

impl Encoder<&Message> for MessageCodec {
    type Error = ChannelError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_frame_size {
            return Err(ChannelError::FrameTooLarge {
                size: item.len(),
                max: self.max_frame_size,
            });
        }
        encode_frame(item.as_bytes(), dst)
    }
}
