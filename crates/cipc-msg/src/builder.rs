use cipc_codec::{CodecError, Encode, Writer};

use crate::error::Result;
use crate::message::{CallId, Message, MethodId, ObjectId};

/// Incremental request construction.
///
/// Arguments are encoded as they are added. The first encoding failure is
/// kept and reported by [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    call_id: CallId,
    method_id: MethodId,
    object_id: ObjectId,
    args: Vec<u8>,
    error: Option<CodecError>,
}

impl RequestBuilder {
    pub fn new(call_id: CallId, method_id: MethodId, object_id: ObjectId) -> Self {
        Self {
            call_id,
            method_id,
            object_id,
            args: Vec::new(),
            error: None,
        }
    }

    /// Append one encoded argument.
    pub fn arg<T: Encode + ?Sized>(mut self, value: &T) -> Self {
        if self.error.is_some() {
            return self;
        }
        let start = self.args.len();
        self.args.resize(start + value.serialized_size(), 0);
        let mut writer = Writer::new(&mut self.args[start..]);
        if let Err(err) = value.encode(&mut writer) {
            self.args.truncate(start);
            self.error = Some(err);
        }
        self
    }

    /// Encoded size of the arguments added so far.
    pub fn args_size(&self) -> usize {
        self.args.len()
    }

    pub fn build(self) -> Result<Message> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        Message::build_request_encoded(self.call_id, self.method_id, self.object_id, &self.args)
    }
}
