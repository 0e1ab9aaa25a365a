/// Errors that can occur while encoding or decoding wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The destination buffer cannot hold the encoded value.
    #[error("buffer too small ({available} bytes, need {needed})")]
    BufferTooSmall { needed: usize, available: usize },

    /// The source buffer ended before the value was complete.
    #[error("unexpected end of input (need {needed} bytes, {remaining} remaining)")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,

    /// A string or container is too long for the 4-byte length prefix.
    #[error("length {len} does not fit in a u32 prefix")]
    LengthOverflow { len: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
