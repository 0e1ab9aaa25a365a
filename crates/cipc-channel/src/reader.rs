use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
#[cfg(unix)]
use cipc_transport::IpcStream;

use crate::codec::{decode_frame, FrameConfig};
use crate::error::{ChannelError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads whole message frames from any `Read` stream.
///
/// Partial reads are buffered internally; callers only see complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next frame, or `None` if the peer closed the stream cleanly
    /// between frames.
    ///
    /// End-of-stream in the middle of a frame is
    /// [`ChannelError::ConnectionClosed`].
    pub fn try_read_frame(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.config.max_frame_size)? {
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            };

            if read == 0 {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(ChannelError::ConnectionClosed)
                };
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read the next frame (blocking). Any end-of-stream is an error.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        self.try_read_frame()?.ok_or(ChannelError::ConnectionClosed)
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Replace the configuration used for subsequent frames.
    pub fn set_config(&mut self, config: FrameConfig) {
        self.config = config;
    }
}

#[cfg(unix)]
impl FrameReader<IpcStream> {
    /// Create a frame reader for an `IpcStream`, applying the read timeout.
    pub fn with_config_ipc(inner: IpcStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
