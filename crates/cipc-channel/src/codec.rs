use bytes::{Buf, BufMut, Bytes, BytesMut};
use cipc_msg::HEADER_SIZE;

use crate::error::{ChannelError, Result};

/// Stream frame prefix: message length as u32 LE.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum message size: 16 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Encode one message into its stream frame.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────────────┐
/// │ Length (4B)  │ Message bytes            │
/// │ u32 LE       │ (Length bytes)           │
/// └──────────────┴──────────────────────────┘
/// ```
pub fn encode_frame(message: &[u8], dst: &mut BytesMut) -> Result<()> {
    if message.len() > u32::MAX as usize {
        return Err(ChannelError::FrameTooLarge {
            size: message.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(LENGTH_PREFIX_SIZE + message.len());
    dst.put_u32_le(message.len() as u32);
    dst.put_slice(message);
    Ok(())
}

/// Decode one message frame from a buffer.
///
/// Returns `Ok(None)` until the buffer holds a complete frame. On success the
/// frame is consumed from the buffer. Lengths that cannot hold a message
/// header, or that exceed `max_frame_size`, are rejected as soon as the
/// prefix is available.
pub fn decode_frame(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Bytes>> {
    let Some(prefix) = src.get(..LENGTH_PREFIX_SIZE) else {
        return Ok(None);
    };
    let mut len_bytes = [0u8; LENGTH_PREFIX_SIZE];
    len_bytes.copy_from_slice(prefix);
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len < HEADER_SIZE {
        return Err(ChannelError::FrameTooShort {
            size: len,
            min: HEADER_SIZE,
        });
    }
    if len > max_frame_size {
        return Err(ChannelError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        });
    }

    if src.len() < LENGTH_PREFIX_SIZE + len {
        src.reserve(LENGTH_PREFIX_SIZE + len - src.len());
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Ok(Some(src.split_to(len).freeze()))
}

/// Limits and timeouts for a channel connection.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum message size in bytes. Default: 16 MiB.
    pub max_frame_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl FrameConfig {
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [u8; 4] = [0x43, 0x02, 0x01, 0x00];

    #[test]
    fn encode_prefixes_length() {
        let mut buf = BytesMut::new();
        encode_frame(&HEADER, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[4, 0, 0, 0, 0x43, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn decode_returns_message_bytes() {
        let mut buf = BytesMut::new();
        encode_frame(&HEADER, &mut buf).unwrap();

        let frame = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();
        assert_eq!(frame.as_ref(), &HEADER);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_incomplete_prefix() {
        let mut buf = BytesMut::from(&[0x04, 0x00][..]);
        assert!(decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn decode_incomplete_body() {
        let mut buf = BytesMut::new();
        encode_frame(b"\x43\x01\x00\x00method-and-object", &mut buf).unwrap();
        buf.truncate(LENGTH_PREFIX_SIZE + 6);

        assert!(decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .is_none());
    }

    #[test]
    fn decode_rejects_length_below_header() {
        let mut buf = BytesMut::from(&[0x03, 0x00, 0x00, 0x00, 0x43, 0x02, 0x00][..]);
        let err = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE).unwrap_err();
        assert!(matches!(err, ChannelError::FrameTooShort { size: 3, min: 4 }));
    }

    #[test]
    fn decode_rejects_oversized_before_body_arrives() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(32 * 1024 * 1024);

        let err = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE).unwrap_err();
        assert!(matches!(err, ChannelError::FrameTooLarge { .. }));
    }

    #[test]
    fn decode_back_to_back_frames() {
        let mut buf = BytesMut::new();
        encode_frame(&[0x43, 0x02, 0x01, 0x00, 0xAA], &mut buf).unwrap();
        encode_frame(&[0x43, 0x02, 0x02, 0x00], &mut buf).unwrap();

        let first = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();
        let second = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();
        assert_eq!(first.as_ref(), &[0x43, 0x02, 0x01, 0x00, 0xAA]);
        assert_eq!(second.as_ref(), &[0x43, 0x02, 0x02, 0x00]);
        assert!(buf.is_empty());
    }

    #[test]
    fn config_builders() {
        let cfg = FrameConfig::default()
            .with_max_frame_size(64)
            .with_read_timeout(Some(std::time::Duration::from_secs(1)));
        assert_eq!(cfg.max_frame_size, 64);
        assert_eq!(cfg.read_timeout, Some(std::time::Duration::from_secs(1)));
        assert_eq!(cfg.write_timeout, None);
    }
}
