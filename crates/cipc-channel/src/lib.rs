//! Message channels for cipc.
//!
//! A channel carries whole [`Message`](cipc_msg::Message)s between two
//! endpoints. On a byte stream every message is framed with:
//! - A 4-byte little-endian message length
//! - The message bytes (header, then arguments or return value)
//!
//! [`Channel`] is the transport-agnostic interface; [`UnixChannel`] binds it
//! to Unix domain sockets. The server side runs [`Channel::accept`] with a
//! handler, the client side uses [`Channel::call`].
//!
//! ```no_run
//! use cipc_channel::{Channel, UnixChannel};
//! use cipc_msg::Message;
//!
//! let mut client = UnixChannel::connect("/tmp/service.sock")?;
//! let request = Message::build_request(1, 0x10, 0, &(42u32,))?;
//! let reply = client.call(&request)?;
//! let value: u32 = reply.return_value()?.decode()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod channel;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(unix)]
pub mod unix;

#[cfg(feature = "async")]
pub mod async_codec;

pub use channel::{check_reply, Channel, Response};
pub use codec::{
    decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE,
};
pub use error::{ChannelError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;

#[cfg(unix)]
pub use unix::{bind, connect, ShutdownHandle, UnixChannel};

#[cfg(feature = "async")]
pub use async_codec::MessageCodec;
