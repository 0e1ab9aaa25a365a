//! Transport-agnostic channel interface.

use cipc_msg::{Message, MessageType};

use crate::error::{ChannelError, Result};

/// Slot a request handler fills with its reply.
///
/// The accept loop hands an empty slot to the handler for every request and
/// transmits whatever message is in it afterwards.
#[derive(Debug, Default)]
pub struct Response {
    message: Option<Message>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the reply, replacing any earlier one.
    pub fn set(&mut self, message: Message) {
        self.message = Some(message);
    }

    pub fn get(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn take(&mut self) -> Option<Message> {
        self.message.take()
    }

    pub fn is_set(&self) -> bool {
        self.message.is_some()
    }
}

impl From<Message> for Response {
    fn from(message: Message) -> Self {
        Self {
            message: Some(message),
        }
    }
}

/// A bidirectional message channel.
///
/// Implementations carry whole messages over some connection. Every method
/// after [`Channel::close`] fails with [`ChannelError::Closed`].
pub trait Channel: Send {
    /// Serve requests until the peer disconnects.
    ///
    /// Each received request is validated and passed to `handler` together
    /// with an empty [`Response`]. A response frame from the peer fails with
    /// [`ChannelError::UnexpectedType`]. The handler runs on the calling thread and
    /// must fill the response before returning; the reply is sent before the
    /// next message is read. A clean disconnect between messages returns
    /// `Ok(())`. Any other failure closes the channel and is returned.
    fn accept(&mut self, handler: &mut dyn FnMut(&Message, &mut Response)) -> Result<()>;

    /// Send `data` as a single frame without inspecting it.
    fn send_raw(&mut self, data: &[u8]) -> Result<()>;

    /// Send a message.
    fn send(&mut self, message: &Message) -> Result<()> {
        self.send_raw(message.as_bytes())
    }

    /// Receive and validate the next message.
    fn recv(&mut self) -> Result<Message>;

    /// Send a request and wait for its response.
    fn call(&mut self, request: &Message) -> Result<Message> {
        self.send(request)?;
        let reply = self.recv()?;
        check_reply(request, &reply)?;
        Ok(reply)
    }

    /// Close the channel. Idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Human-readable address of the channel endpoint.
    fn address(&self) -> String;
}

/// Check that `reply` is the response to `request`.
pub fn check_reply(request: &Message, reply: &Message) -> Result<()> {
    let kind = reply.message_type()?;
    if kind != MessageType::Response {
        return Err(ChannelError::UnexpectedType {
            expected: MessageType::Response,
            actual: kind,
        });
    }
    if reply.call_id() != request.call_id() {
        return Err(ChannelError::CallIdMismatch {
            expected: request.call_id(),
            actual: reply.call_id(),
        });
    }
    Ok(())
}
