use cipc_msg::{CallId, MessageType};

/// Errors that can occur on a message channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Binding, accepting or connecting failed.
    #[error("transport error: {0}")]
    Transport(#[from] cipc_transport::TransportError),

    /// An I/O error occurred while reading or writing frames.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A received frame is not a valid message.
    #[error("invalid message: {0}")]
    Message(#[from] cipc_msg::MessageError),

    /// The frame length exceeds the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The frame length cannot hold a message header.
    #[error("frame too short ({size} bytes, min {min})")]
    FrameTooShort { size: usize, min: usize },

    /// The peer went away in the middle of a frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// A listening channel has no connected peer yet.
    #[error("channel has no connected peer")]
    NotConnected,

    /// The channel was closed; it cannot be reused.
    #[error("channel is closed")]
    Closed,

    /// The request handler did not produce a response.
    #[error("handler produced no response for call {call_id}")]
    MissingResponse { call_id: CallId },

    /// A reply carried a different call id than the request.
    #[error("response call id {actual} does not match request call id {expected}")]
    CallIdMismatch { expected: CallId, actual: CallId },

    /// A message of the wrong kind arrived.
    #[error("expected a {expected:?} message, got {actual:?}")]
    UnexpectedType {
        expected: MessageType,
        actual: MessageType,
    },
}

impl ChannelError {
    /// Whether this error came from a peer closing the stream.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::ConnectionClosed => true,
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }

    /// Whether this error came from a read or write timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Io(err) if matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
