//! Typed request/response IPC over Unix domain sockets.
//!
//! cipc serializes method arguments into compact little-endian byte
//! layouts, wraps them in request and response messages, and carries those
//! messages over a channel.
//!
//! # Crate Structure
//!
//! - [`codec`]: binary encoding of primitives, strings and containers
//! - [`msg`]: request/response message layout and accessors
//! - [`transport`]: Unix domain socket listener and stream
//! - [`channel`]: message channels, the accept loop and the client call path
//!
//! ```no_run
//! use cipc::{Channel, Message, UnixChannel};
//!
//! let mut server = UnixChannel::bind("/tmp/adder.sock")?;
//! server.accept(&mut |request, response| {
//!     let (a, b): (u32, u32) = match request.args_data() {
//!         Ok(args) => {
//!             let mut reader = args.reader();
//!             (reader.decode().unwrap_or(0), reader.decode().unwrap_or(0))
//!         }
//!         Err(_) => (0, 0),
//!     };
//!     if let Ok(reply) = Message::build_response(request.call_id(), &(a + b)) {
//!         response.set(reply);
//!     }
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Re-export codec types.
pub mod codec {
    pub use cipc_codec::*;
}

/// Re-export message types.
pub mod msg {
    pub use cipc_msg::*;
}

/// Re-export transport types.
pub mod transport {
    pub use cipc_transport::*;
}

/// Re-export channel types.
pub mod channel {
    pub use cipc_channel::*;
}

pub use cipc_channel::{Channel, ChannelError, FrameConfig, Response};
#[cfg(unix)]
pub use cipc_channel::{ShutdownHandle, UnixChannel};
pub use cipc_codec::{deserialize, serialize, ArgData, Codec, CodecError, Decode, Encode};
pub use cipc_msg::{CallId, Message, MessageError, MessageType, MethodId, ObjectId};
