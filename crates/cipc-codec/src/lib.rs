//! Canonical serialization for cipc wire values.
//!
//! Every supported value has one byte encoding:
//! - Integers and floats: fixed width, little-endian
//! - `bool`: one byte, 0 or 1
//! - Strings: 4-byte little-endian byte length, then the UTF-8 bytes
//! - Sequences, sets and maps: 4-byte little-endian count, then elements
//!   (or key/value pairs) in iteration order
//!
//! [`serialize`] and [`deserialize`] return the number of bytes written or
//! consumed, and `0` on failure. The `try_*` variants report why.

pub mod arg_data;
pub mod codec;
pub mod containers;
pub mod cursor;
pub mod error;

pub use arg_data::ArgData;
pub use codec::{
    deserialize, serialize, serialized_size, to_vec, try_deserialize, try_serialize, Codec,
    Decode, Encode,
};
pub use cursor::{Reader, Writer, LEN_PREFIX_SIZE};
pub use error::{CodecError, Result};
