use crate::message::MessageType;

/// Errors that can occur while building or inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// The buffer is shorter than the fixed prefix of its message type.
    #[error("message truncated ({len} bytes, need at least {min})")]
    Truncated { len: usize, min: usize },

    /// The first byte is not the protocol sentinel.
    #[error("invalid message preamble 0x{found:02X} (expected 0x{expected:02X})")]
    InvalidPreamble { found: u8, expected: u8 },

    /// The type byte names neither a request nor a response.
    #[error("unknown message type {0}")]
    UnknownType(u8),

    /// A field was read from the wrong kind of message.
    #[error("{field} is only present in {expected:?} messages")]
    WrongType {
        field: &'static str,
        expected: MessageType,
    },

    /// Encoding the arguments or return value failed.
    #[error("codec error: {0}")]
    Codec(#[from] cipc_codec::CodecError),
}

pub type Result<T> = std::result::Result<T, MessageError>;
