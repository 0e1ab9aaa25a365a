use std::io::{ErrorKind, Write};

use bytes::BytesMut;
#[cfg(unix)]
use cipc_transport::IpcStream;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{ChannelError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes whole message frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
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

    /// Frame and send one message (blocking).
    ///
    /// The length prefix and body go out in a single buffer so a frame is
    /// never interleaved with a partial write of another.
    pub fn send(&mut self, message: &[u8]) -> Result<()> {
        if message.len() > self.config.max_frame_size {
            return Err(ChannelError::FrameTooLarge {
                size: message.len(),
                max: self.config.max_frame_size,
            });
        }

        self.buf.clear();
        encode_frame(message, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(ChannelError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }

        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
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
impl FrameWriter<IpcStream> {
    /// Create a frame writer for an `IpcStream`, applying the write timeout.
    pub fn with_config_ipc(inner: IpcStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
