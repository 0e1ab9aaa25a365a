use bytes::{Bytes, BytesMut};
use cipc_codec::{ArgData, Encode, Writer};

use crate::args::Args;
use crate::builder::RequestBuilder;
use crate::error::{MessageError, Result};

/// Sentinel byte at offset 0 of every message (ASCII `'C'`).
pub const PREAMBLE: u8 = 0x43;

/// Header: preamble (1) + type (1) + call id (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

pub const TYPE_OFFSET: usize = 1;
pub const CALL_ID_OFFSET: usize = 2;
pub const METHOD_ID_OFFSET: usize = HEADER_SIZE;
pub const OBJECT_ID_OFFSET: usize = METHOD_ID_OFFSET + 4;
/// Start of the encoded arguments in a request.
pub const ARGS_OFFSET: usize = OBJECT_ID_OFFSET + 8;
/// Start of the encoded return value in a response.
pub const RETURN_VALUE_OFFSET: usize = HEADER_SIZE;

/// Correlates a response with the request it answers.
pub type CallId = u16;
/// Selects the remote operation.
pub type MethodId = u32;
/// Selects the remote object instance.
pub type ObjectId = u64;

/// Object id addressing the service root object.
pub const ROOT_OBJECT: ObjectId = 0;

/// Discriminates requests from responses (header byte 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Request = 1,
    Response = 2,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Size of the fixed prefix preceding the payload.
    pub fn prefix_size(self) -> usize {
        match self {
            MessageType::Request => ARGS_OFFSET,
            MessageType::Response => RETURN_VALUE_OFFSET,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = MessageError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(MessageType::Request),
            2 => Ok(MessageType::Response),
            other => Err(MessageError::UnknownType(other)),
        }
    }
}

/// One framed request or response.
///
/// Request wire format:
/// ```text
/// ┌──────────┬──────┬──────────┬────────────┬────────────┬──────────┐
/// │ Preamble │ Type │ Call ID  │ Method ID  │ Object ID  │ Args     │
/// │ 0x43     │ 1    │ (2B LE)  │ (4B LE)    │ (8B LE)    │ (var)    │
/// └──────────┴──────┴──────────┴────────────┴────────────┴──────────┘
/// ```
///
/// Response wire format:
/// ```text
/// ┌──────────┬──────┬──────────┬──────────────┐
/// │ Preamble │ Type │ Call ID  │ Return value │
/// │ 0x43     │ 2    │ (2B LE)  │ (var)        │
/// └──────────┴──────┴──────────┴──────────────┘
/// ```
///
/// A constructed message always holds at least the fixed prefix for its
/// type byte, so header reads never go out of bounds. Whether the preamble
/// and type are valid is checked by [`Message::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    data: Bytes,
}

impl Message {
    /// Build a request carrying `args` encoded in declared order.
    ///
    /// ```
    /// use cipc_msg::{Message, MessageType};
    ///
    /// let msg = Message::build_request(7, 0x10, 0, &(42u32, "hi")).unwrap();
    /// assert_eq!(msg.message_type().unwrap(), MessageType::Request);
    /// assert_eq!(msg.call_id(), 7);
    /// ```
    pub fn build_request<A: Args + ?Sized>(
        call_id: CallId,
        method_id: MethodId,
        object_id: ObjectId,
        args: &A,
    ) -> Result<Self> {
        let mut buf = BytesMut::zeroed(ARGS_OFFSET + args.args_size());
        let mut writer = Writer::new(&mut buf[..]);
        write_request_prefix(&mut writer, call_id, method_id, object_id)?;
        args.encode_args(&mut writer)?;
        Ok(Self { data: buf.freeze() })
    }

    /// Build a response carrying a single encoded return value.
    pub fn build_response<T: Encode + ?Sized>(call_id: CallId, value: &T) -> Result<Self> {
        let mut buf = BytesMut::zeroed(RETURN_VALUE_OFFSET + value.serialized_size());
        let mut writer = Writer::new(&mut buf[..]);
        write_header(&mut writer, MessageType::Response, call_id)?;
        value.encode(&mut writer)?;
        Ok(Self { data: buf.freeze() })
    }

    /// Build a request whose arguments are already encoded.
    pub fn build_request_encoded(
        call_id: CallId,
        method_id: MethodId,
        object_id: ObjectId,
        args: &[u8],
    ) -> Result<Self> {
        let mut buf = BytesMut::zeroed(ARGS_OFFSET + args.len());
        let mut writer = Writer::new(&mut buf[..]);
        write_request_prefix(&mut writer, call_id, method_id, object_id)?;
        writer.put_slice(args)?;
        Ok(Self { data: buf.freeze() })
    }

    /// Build a response whose return value is already encoded.
    pub fn build_response_encoded(call_id: CallId, value: &[u8]) -> Result<Self> {
        let mut buf = BytesMut::zeroed(RETURN_VALUE_OFFSET + value.len());
        let mut writer = Writer::new(&mut buf[..]);
        write_header(&mut writer, MessageType::Response, call_id)?;
        writer.put_slice(value)?;
        Ok(Self { data: buf.freeze() })
    }

    /// Start a request whose arguments are appended one at a time.
    pub fn request(call_id: CallId, method_id: MethodId, object_id: ObjectId) -> RequestBuilder {
        RequestBuilder::new(call_id, method_id, object_id)
    }

    /// Wrap received bytes.
    ///
    /// Only the minimum length is checked here: the header, plus the method
    /// and object ids when the type byte says request.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let min = match data.get(TYPE_OFFSET).copied().map(MessageType::try_from) {
            Some(Ok(kind)) => kind.prefix_size(),
            _ => HEADER_SIZE,
        };
        if data.len() < min {
            return Err(MessageError::Truncated {
                len: data.len(),
                min,
            });
        }
        Ok(Self { data })
    }

    /// Copy an external byte range into a new message.
    pub fn copy_from_slice(data: &[u8]) -> Result<Self> {
        Self::from_bytes(Bytes::copy_from_slice(data))
    }

    /// Check the preamble and type byte.
    pub fn validate(&self) -> Result<()> {
        let preamble = self.preamble();
        if preamble != PREAMBLE {
            return Err(MessageError::InvalidPreamble {
                found: preamble,
                expected: PREAMBLE,
            });
        }
        self.message_type().map(|_| ())
    }

    pub fn preamble(&self) -> u8 {
        self.data[0]
    }

    pub fn message_type(&self) -> Result<MessageType> {
        MessageType::try_from(self.data[TYPE_OFFSET])
    }

    pub fn is_request(&self) -> bool {
        matches!(self.message_type(), Ok(MessageType::Request))
    }

    pub fn is_response(&self) -> bool {
        matches!(self.message_type(), Ok(MessageType::Response))
    }

    pub fn call_id(&self) -> CallId {
        u16::from_le_bytes(self.array_at(CALL_ID_OFFSET))
    }

    pub fn method_id(&self) -> Result<MethodId> {
        self.expect_type("method_id", MessageType::Request)?;
        Ok(u32::from_le_bytes(self.array_at(METHOD_ID_OFFSET)))
    }

    pub fn object_id(&self) -> Result<ObjectId> {
        self.expect_type("object_id", MessageType::Request)?;
        Ok(u64::from_le_bytes(self.array_at(OBJECT_ID_OFFSET)))
    }

    /// Encoded arguments of a request.
    pub fn args_data(&self) -> Result<ArgData<'_>> {
        self.expect_type("args", MessageType::Request)?;
        Ok(ArgData::new(&self.data[ARGS_OFFSET..]))
    }

    /// Encoded return value of a response.
    pub fn return_value(&self) -> Result<ArgData<'_>> {
        self.expect_type("return_value", MessageType::Response)?;
        Ok(ArgData::new(&self.data[RETURN_VALUE_OFFSET..]))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: a message holds at least its header.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    fn expect_type(&self, field: &'static str, expected: MessageType) -> Result<()> {
        if self.message_type()? == expected {
            Ok(())
        } else {
            Err(MessageError::WrongType { field, expected })
        }
    }

    // Callers only pass offsets inside the prefix guaranteed by `from_bytes`
    // or the builders.
    fn array_at<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[offset..offset + N]);
        out
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("Message");
        out.field("call_id", &self.call_id());
        match self.message_type() {
            Ok(MessageType::Request) => {
                out.field("type", &MessageType::Request);
                if let (Ok(method_id), Ok(object_id)) = (self.method_id(), self.object_id()) {
                    out.field("method_id", &method_id)
                        .field("object_id", &object_id);
                }
            }
            Ok(kind) => {
                out.field("type", &kind);
            }
            Err(_) => {
                out.field("type", &self.data[TYPE_OFFSET]);
            }
        }
        out.field("len", &self.data.len()).finish()
    }
}

pub(crate) fn write_header(
    writer: &mut Writer<'_>,
    kind: MessageType,
    call_id: CallId,
) -> Result<()> {
    writer.put_u8(PREAMBLE)?;
    writer.put_u8(kind.as_u8())?;
    writer.put_u16_le(call_id)?;
    Ok(())
}

pub(crate) fn write_request_prefix(
    writer: &mut Writer<'_>,
    call_id: CallId,
    method_id: MethodId,
    object_id: ObjectId,
) -> Result<()> {
    write_header(writer, MessageType::Request, call_id)?;
    writer.put_u32_le(method_id)?;
    writer.put_u64_le(object_id)?;
    Ok(())
}
