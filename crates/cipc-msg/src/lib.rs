//! Request/response message framing for cipc.
//!
//! A message is a 4-byte header (preamble, type, call id) followed by
//! either the method id, object id and encoded arguments of a request, or
//! the encoded return value of a response. All multi-byte fields are
//! little-endian.
//!
//! Argument and return-value bytes are exposed as borrowed
//! [`ArgData`](cipc_codec::ArgData) views and decoded with `cipc-codec`.

pub mod args;
pub mod builder;
pub mod error;
pub mod message;

pub use args::Args;
pub use builder::RequestBuilder;
pub use cipc_codec::ArgData;
pub use error::{MessageError, Result};
pub use message::{
    CallId, Message, MessageType, MethodId, ObjectId, ARGS_OFFSET, HEADER_SIZE, PREAMBLE,
    RETURN_VALUE_OFFSET, ROOT_OBJECT,
};
