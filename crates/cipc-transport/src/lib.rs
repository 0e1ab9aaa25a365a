//! Local stream transport for cipc.
//!
//! Unix-only. The lowest layer: a Unix domain socket listener/connector and the
//! [`IpcStream`] byte stream it yields. Message framing lives in
//! `cipc-channel`.

pub mod error;
#[cfg(unix)]
pub mod traits;
#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
#[cfg(unix)]
pub use traits::IpcStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
