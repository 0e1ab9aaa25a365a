use crate::cursor::{Reader, Writer, LEN_PREFIX_SIZE};
use crate::error::{CodecError, Result};

/// A value with a canonical wire encoding.
///
/// `serialized_size` must return exactly the number of bytes `encode`
/// writes. Every encodable value has a non-zero size, which keeps `0`
/// free as the failure sentinel of [`serialize`].
pub trait Encode {
    /// Exact encoded size in bytes.
    fn serialized_size(&self) -> usize;

    /// Write the encoded value at the writer's position.
    fn encode(&self, writer: &mut Writer<'_>) -> Result<()>;
}

/// A value that can be rebuilt from its canonical wire encoding.
pub trait Decode: Sized {
    fn decode(reader: &mut Reader<'_>) -> Result<Self>;
}

/// Values that can travel in both directions.
pub trait Codec: Encode + Decode {}

impl<T: Encode + Decode> Codec for T {}

impl<T: Encode + ?Sized> Encode for &T {
    fn serialized_size(&self) -> usize {
        (**self).serialized_size()
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        (**self).encode(writer)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn serialized_size(&self) -> usize {
        (**self).serialized_size()
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        (**self).encode(writer)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        T::decode(reader).map(Box::new)
    }
}

// Integers and floats: fixed width, little-endian regardless of host order.
macro_rules! fixed_width_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn serialized_size(&self) -> usize {
                    std::mem::size_of::<$ty>()
                }

                fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
                    writer.put_slice(&self.to_le_bytes())
                }
            }

            impl Decode for $ty {
                fn decode(reader: &mut Reader<'_>) -> Result<Self> {
                    Ok(<$ty>::from_le_bytes(reader.take_array()?))
                }
            }
        )*
    };
}

fixed_width_codec!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Encode for bool {
    fn serialized_size(&self) -> usize {
        1
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.put_u8(u8::from(*self))
    }
}

impl Decode for bool {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(reader.get_u8()? != 0)
    }
}

impl Encode for str {
    fn serialized_size(&self) -> usize {
        LEN_PREFIX_SIZE + self.len()
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.put_len(self.len())?;
        writer.put_slice(self.as_bytes())
    }
}

impl Encode for String {
    fn serialized_size(&self) -> usize {
        self.as_str().serialized_size()
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        self.as_str().encode(writer)
    }
}

impl Decode for String {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let len = reader.get_len()?;
        let bytes = reader.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8)
    }
}

/// Exact encoded size of `value`.
pub fn serialized_size<T: Encode + ?Sized>(value: &T) -> usize {
    value.serialized_size()
}

/// Encode `value` at the start of `buf`.
///
/// Fails with [`CodecError::BufferTooSmall`] before writing anything if the
/// buffer cannot hold the whole value.
pub fn try_serialize<T: Encode + ?Sized>(value: &T, buf: &mut [u8]) -> Result<usize> {
    let needed = value.serialized_size();
    if buf.len() < needed {
        return Err(CodecError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }
    let mut writer = Writer::new(buf);
    value.encode(&mut writer)?;
    Ok(writer.position())
}

/// Encode `value` at the start of `buf`, returning the bytes written.
///
/// Returns `0` if the value does not fit (nothing is written) or cannot be
/// encoded.
pub fn serialize<T: Encode + ?Sized>(value: &T, buf: &mut [u8]) -> usize {
    try_serialize(value, buf).unwrap_or(0)
}

/// Decode a value from the start of `buf`, returning it with the number of
/// bytes consumed.
pub fn try_deserialize<T: Decode>(buf: &[u8]) -> Result<(T, usize)> {
    let mut reader = Reader::new(buf);
    let value = T::decode(&mut reader)?;
    Ok((value, reader.position()))
}

/// Decode a value from the start of `buf` into `dst`, returning the bytes
/// consumed.
///
/// Returns `0` if `buf` is too short or malformed; `dst` is left untouched
/// in that case.
pub fn deserialize<T: Decode>(dst: &mut T, buf: &[u8]) -> usize {
    match try_deserialize(buf) {
        Ok((value, consumed)) => {
            *dst = value;
            consumed
        }
        Err(_) => 0,
    }
}

/// Encode `value` into a freshly allocated buffer of exactly its size.
pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; value.serialized_size()];
    try_serialize(value, &mut buf)?;
    Ok(buf)
}
