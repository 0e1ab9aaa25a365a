//! [`Channel`] over Unix domain sockets.

use std::net::Shutdown;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cipc_msg::{Message, MessageType};
use cipc_transport::{IpcStream, UnixDomainSocket};
use tracing::{debug, info, trace, warn};

use crate::channel::{Channel, Response};
use crate::codec::FrameConfig;
use crate::error::{ChannelError, Result};
use crate::reader::FrameReader;
use crate::writer::FrameWriter;

/// Connect to a listening channel at `path`.
pub fn connect(path: impl AsRef<Path>) -> Result<Box<dyn Channel>> {
    Ok(Box::new(UnixChannel::connect(path)?))
}

/// Listen for a peer at `path`.
pub fn bind(path: impl AsRef<Path>) -> Result<Box<dyn Channel>> {
    Ok(Box::new(UnixChannel::bind(path)?))
}

struct Connection {
    reader: FrameReader<IpcStream>,
    writer: FrameWriter<IpcStream>,
}

impl Connection {
    fn open(stream: IpcStream, config: &FrameConfig, shutdown: &ShutdownState) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        shutdown.register(stream.try_clone()?);
        Ok(Self {
            reader: FrameReader::with_config_ipc(reader_stream, config.clone())?,
            writer: FrameWriter::with_config_ipc(stream, config.clone())?,
        })
    }

    fn reconfigure(&mut self, config: &FrameConfig) -> Result<()> {
        let reader_stream = self.reader.get_ref();
        reader_stream.set_read_timeout(config.read_timeout)?;
        self.writer.get_ref().set_write_timeout(config.write_timeout)?;
        self.reader.set_config(config.clone());
        self.writer.set_config(config.clone());
        Ok(())
    }

    fn read_message(&mut self) -> Result<Option<Message>> {
        let Some(frame) = self.reader.try_read_frame()? else {
            return Ok(None);
        };
        let message = Message::from_bytes(frame)?;
        message.validate()?;
        Ok(Some(message))
    }

    fn shutdown(&self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}

enum State {
    Connected(Connection),
    Listening {
        socket: UnixDomainSocket,
        peer: Option<Connection>,
    },
    Closed,
}

#[derive(Debug, Default)]
struct ShutdownState {
    requested: AtomicBool,
    active: Mutex<Option<IpcStream>>,
    listen_path: Option<PathBuf>,
}

impl ShutdownState {
    fn register(&self, stream: IpcStream) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(stream);
        }
    }

    fn unregister(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }

    fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Stops a [`UnixChannel`] from another thread.
///
/// A blocked read on the active connection returns end-of-stream, and a
/// listener still waiting for its peer is woken up. The channel closes once
/// its current operation returns.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    state: Arc<ShutdownState>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.state.requested.store(true, Ordering::SeqCst);

        let woke_peer = match self.state.active.lock() {
            Ok(active) => active
                .as_ref()
                .map(|stream| stream.shutdown(Shutdown::Both).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        };
        if woke_peer {
            return;
        }
        if let Some(path) = &self.state.listen_path {
            // Unblock a pending accept; the connection is discarded.
            let _ = UnixDomainSocket::connect(path);
        }
    }

    pub fn is_requested(&self) -> bool {
        self.state.is_requested()
    }
}

/// A message channel over a Unix domain socket.
///
/// Created in one of two roles: [`UnixChannel::connect`] joins an existing
/// listener, [`UnixChannel::bind`] listens and serves one peer per
/// [`Channel::accept`] call. Frames on the stream are length-prefixed
/// messages; see [`crate::codec`].
pub struct UnixChannel {
    state: State,
    path: PathBuf,
    config: FrameConfig,
    shutdown: Arc<ShutdownState>,
}

impl UnixChannel {
    /// Connect to a listener at `path`.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let config = FrameConfig::default();
        let shutdown = Arc::new(ShutdownState::default());
        let stream = UnixDomainSocket::connect(&path)?;
        let connection = Connection::open(stream, &config, &shutdown)?;
        info!(?path, "channel connected");
        Ok(Self {
            state: State::Connected(connection),
            path,
            config,
            shutdown,
        })
    }

    /// Listen at `path`. The peer is accepted by [`Channel::accept`].
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let socket = UnixDomainSocket::bind(&path)?;
        info!(?path, "channel listening");
        Ok(Self {
            state: State::Listening { socket, peer: None },
            shutdown: Arc::new(ShutdownState {
                listen_path: Some(path.clone()),
                ..ShutdownState::default()
            }),
            path,
            config: FrameConfig::default(),
        })
    }

    /// Apply frame limits and timeouts to this and any later connection.
    pub fn with_config(mut self, config: FrameConfig) -> Result<Self> {
        match &mut self.state {
            State::Connected(conn) => conn.reconfigure(&config)?,
            State::Listening {
                peer: Some(conn), ..
            } => conn.reconfigure(&config)?,
            State::Listening { peer: None, .. } => {}
            State::Closed => return Err(ChannelError::Closed),
        }
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            state: Arc::clone(&self.shutdown),
        }
    }

    /// Whether a peer connection is currently established.
    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            State::Connected(_) | State::Listening { peer: Some(_), .. }
        )
    }

    /// The active connection. A listener without a peer accepts one first
    /// when `wait_for_peer` is set.
    fn connection(&mut self, wait_for_peer: bool) -> Result<&mut Connection> {
        match &mut self.state {
            State::Closed => Err(ChannelError::Closed),
            State::Connected(conn) => Ok(conn),
            State::Listening { socket, peer } => {
                if peer.is_none() {
                    if !wait_for_peer {
                        return Err(ChannelError::NotConnected);
                    }
                    let stream = socket.accept()?;
                    *peer = Some(Connection::open(stream, &self.config, &self.shutdown)?);
                    debug!(path = ?self.path, "peer attached");
                }
                peer.as_mut().ok_or(ChannelError::NotConnected)
            }
        }
    }

    /// Drop the current peer after a clean disconnect. A connected channel
    /// has nothing left to talk to and closes.
    fn detach_peer(&mut self) {
        self.shutdown.unregister();
        if let State::Listening { peer, .. } = &mut self.state {
            if let Some(conn) = peer.take() {
                conn.shutdown();
            }
            debug!(path = ?self.path, "peer detached");
        } else {
            self.close();
        }
    }

    /// Close on errors that leave the connection unusable.
    fn fail(&mut self, err: &ChannelError) {
        if matches!(err, ChannelError::Closed | ChannelError::NotConnected) {
            return;
        }
        warn!(path = ?self.path, error = %err, "closing channel after error");
        self.close();
    }

    fn serve(&mut self, handler: &mut dyn FnMut(&Message, &mut Response)) -> Result<bool> {
        let shutdown = Arc::clone(&self.shutdown);
        let conn = self.connection(true)?;
        loop {
            if shutdown.is_requested() {
                return Ok(false);
            }
            let Some(message) = conn.read_message()? else {
                return Ok(!shutdown.is_requested());
            };

            let kind = message.message_type()?;
            if kind != MessageType::Request {
                return Err(ChannelError::UnexpectedType {
                    expected: MessageType::Request,
                    actual: kind,
                });
            }
            let call_id = message.call_id();
            let (method_id, object_id) = (message.method_id()?, message.object_id()?);
            debug!(call_id, method_id, object_id, "dispatching request");

            let mut response = Response::new();
            handler(&message, &mut response);
            let reply = response
                .take()
                .ok_or(ChannelError::MissingResponse { call_id })?;

            trace!(call_id, len = reply.len(), "sending reply");
            conn.writer.send(reply.as_bytes())?;
        }
    }
}

impl Channel for UnixChannel {
    fn accept(&mut self, handler: &mut dyn FnMut(&Message, &mut Response)) -> Result<()> {
        match self.serve(handler) {
            Ok(true) => {
                debug!(path = ?self.path, "peer disconnected");
                self.detach_peer();
                Ok(())
            }
            Ok(false) => {
                info!(path = ?self.path, "channel shut down");
                self.close();
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        let result = self
            .connection(false)
            .and_then(|conn| conn.writer.send(data));
        if let Err(err) = &result {
            // An oversized message never reached the stream.
            if !matches!(err, ChannelError::FrameTooLarge { .. }) {
                self.fail(err);
            }
        }
        result
    }

    fn recv(&mut self) -> Result<Message> {
        let result = self
            .connection(false)
            .and_then(|conn| conn.read_message()?.ok_or(ChannelError::ConnectionClosed));
        if let Err(err) = &result {
            self.fail(err);
        }
        result
    }

    fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, State::Closed);
        if matches!(state, State::Closed) {
            return;
        }
        self.shutdown.unregister();
        if let State::Connected(conn)
        | State::Listening {
            peer: Some(conn), ..
        } = &state
        {
            conn.shutdown();
        }
        drop(state);
        debug!(path = ?self.path, "channel closed");
    }

    fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    fn address(&self) -> String {
        format!("unix:{}", self.path.display())
    }
}

impl Drop for UnixChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for UnixChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Connected(_) => "connected",
            State::Listening { peer: Some(_), .. } => "serving",
            State::Listening { peer: None, .. } => "listening",
            State::Closed => "closed",
        };
        f.debug_struct("UnixChannel")
            .field("path", &self.path)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::thread;
    use std::time::Duration;

    use cipc_msg::{MessageError, MessageType};

    use super::*;

    fn make_sock_path(tag: &str) -> PathBuf {
        let dir = PathBuf::from(format!(
            "/tmp/cipc-ch-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join("channel.sock")
    }

    fn cleanup(sock_path: &Path) {
        if let Some(parent) = sock_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    fn echo_args(message: &Message, response: &mut Response) {
        let args = message.args_data().expect("request should carry args");
        let reply = Message::build_response_encoded(message.call_id(), args.as_bytes())
            .expect("response should build");
        response.set(reply);
    }

    #[test]
    fn request_response_exchange() {
        let sock_path = make_sock_path("exchange");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            server
                .accept(&mut |message, response| {
                    let (a, b): (u32, u16) = {
                        let mut reader = message.args_data().unwrap().reader();
                        (reader.decode().unwrap(), reader.decode().unwrap())
                    };
                    assert_eq!(message.method_id().unwrap(), 0x11223344);
                    let reply = Message::build_response(message.call_id(), &(a + b as u32));
                    response.set(reply.unwrap());
                })
                .expect("accept should end cleanly");
            assert!(!server.is_closed());
            assert!(!server.is_connected());
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        let request = Message::build_request(0xABCD, 0x11223344, 0, &(40u32, 2u16)).unwrap();
        let reply = client.call(&request).expect("call should succeed");

        assert_eq!(reply.message_type().unwrap(), MessageType::Response);
        assert_eq!(reply.call_id(), 0xABCD);
        assert_eq!(reply.return_value().unwrap().decode::<u32>().unwrap(), 42);

        drop(client);
        server_thread.join().expect("server thread should finish");
        cleanup(&sock_path);
    }

    #[test]
    fn back_to_back_requests_answered_in_order() {
        let sock_path = make_sock_path("order");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            let mut handled = 0u32;
            server
                .accept(&mut |message, response| {
                    handled += 1;
                    echo_args(message, response);
                })
                .expect("accept should end cleanly");
            handled
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        for call_id in 0..16u16 {
            let request = Message::build_request(call_id, 1, 0, &(call_id as u64,)).unwrap();
            client.send(&request).expect("send should succeed");
        }
        for call_id in 0..16u16 {
            let reply = client.recv().expect("reply should arrive");
            assert_eq!(reply.call_id(), call_id);
            assert_eq!(
                reply.return_value().unwrap().decode::<u64>().unwrap(),
                call_id as u64
            );
        }

        client.close();
        assert_eq!(server_thread.join().expect("server thread should finish"), 16);
        cleanup(&sock_path);
    }

    #[test]
    fn malformed_frame_rejected_before_dispatch() {
        let sock_path = make_sock_path("malformed");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            let mut dispatched = false;
            let err = server
                .accept(&mut |message, response| {
                    dispatched = true;
                    echo_args(message, response);
                })
                .expect_err("bad preamble should end the loop");
            assert!(server.is_closed());
            (err, dispatched)
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        client
            .send_raw(&[0x00, 0x01, 0x00, 0x00, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])
            .expect("raw send should succeed");

        let (err, dispatched) = server_thread.join().expect("server thread should finish");
        assert!(!dispatched);
        assert!(matches!(
            err,
            ChannelError::Message(MessageError::InvalidPreamble { found: 0x00, .. })
        ));
        cleanup(&sock_path);
    }

    #[test]
    fn response_frame_rejected_before_dispatch() {
        let sock_path = make_sock_path("response");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            let mut dispatched = false;
            let err = server
                .accept(&mut |message, response| {
                    dispatched = true;
                    response.set(message.clone());
                })
                .expect_err("a response frame should end the loop");
            (err, dispatched, server.is_closed())
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        let stray = Message::build_response(3, &1u8).unwrap();
        client.send(&stray).expect("send should succeed");

        let (err, dispatched, closed) = server_thread.join().expect("server thread should finish");
        assert!(!dispatched);
        assert!(closed);
        assert!(matches!(
            err,
            ChannelError::UnexpectedType {
                expected: MessageType::Request,
                actual: MessageType::Response,
            }
        ));
        cleanup(&sock_path);
    }

    #[test]
    fn second_bind_on_live_path_fails() {
        let sock_path = make_sock_path("inuse");
        let mut first = UnixChannel::bind(&sock_path).expect("first bind should succeed");

        let err = UnixChannel::bind(&sock_path).expect_err("second bind should fail");
        assert!(matches!(
            err,
            ChannelError::Transport(cipc_transport::TransportError::Bind { ref source, .. })
                if source.kind() == std::io::ErrorKind::AddrInUse
        ));

        // The first listener keeps the address.
        let server_thread = thread::spawn(move || {
            // The failed bind's liveness check shows up as an empty session.
            first
                .accept(&mut |message, response| echo_args(message, response))
                .expect("empty session should end cleanly");
            first
                .accept(&mut |message, response| echo_args(message, response))
                .expect("client session should end cleanly");
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        let request = Message::build_request(4, 1, 0, &(9u8,)).unwrap();
        let reply = client.call(&request).expect("first listener should answer");
        assert_eq!(reply.return_value().unwrap().as_bytes(), &[9]);
        drop(client);

        server_thread.join().expect("server thread should finish");
        cleanup(&sock_path);
    }

    #[test]
    fn truncated_request_rejected() {
        let sock_path = make_sock_path("truncated");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            server
                .accept(&mut |message, response| echo_args(message, response))
                .expect_err("short request should end the loop")
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        client
            .send_raw(&[0x43, 0x01, 0x01, 0x00, 0xAA])
            .expect("raw send should succeed");

        let err = server_thread.join().expect("server thread should finish");
        assert!(matches!(
            err,
            ChannelError::Message(MessageError::Truncated { len: 5, min: 16 })
        ));
        cleanup(&sock_path);
    }

    #[test]
    fn missing_response_closes_channel() {
        let sock_path = make_sock_path("missing");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            let err = server
                .accept(&mut |_message, _response| {})
                .expect_err("empty response should end the loop");
            assert!(server.is_closed());
            err
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        let request = Message::build_request(9, 1, 0, &()).unwrap();
        client.send(&request).expect("send should succeed");
        let reply = client.recv();
        assert!(reply.is_err());
        assert!(client.is_closed());

        let err = server_thread.join().expect("server thread should finish");
        assert!(matches!(err, ChannelError::MissingResponse { call_id: 9 }));
        cleanup(&sock_path);
    }

    #[test]
    fn call_detects_call_id_mismatch() {
        let sock_path = make_sock_path("mismatch");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            server
                .accept(&mut |message, response| {
                    let reply = Message::build_response(message.call_id().wrapping_add(1), &0u8);
                    response.set(reply.unwrap());
                })
                .expect("accept should end cleanly");
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        let request = Message::build_request(5, 1, 0, &()).unwrap();
        let err = client.call(&request).expect_err("mismatched reply should fail");
        assert!(matches!(
            err,
            ChannelError::CallIdMismatch {
                expected: 5,
                actual: 6
            }
        ));
        assert!(!client.is_closed());

        client.close();
        server_thread.join().expect("server thread should finish");
        cleanup(&sock_path);
    }

    #[test]
    fn closed_channel_stays_closed() {
        let sock_path = make_sock_path("closed");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");
        server.close();
        server.close();

        assert!(server.is_closed());
        assert!(matches!(
            server.send_raw(&[0x43, 0x02, 0x00, 0x00]),
            Err(ChannelError::Closed)
        ));
        assert!(matches!(server.recv(), Err(ChannelError::Closed)));
        assert!(matches!(
            server.accept(&mut |_m, _r| {}),
            Err(ChannelError::Closed)
        ));
        assert!(matches!(
            server.with_config(FrameConfig::default()),
            Err(ChannelError::Closed)
        ));
        cleanup(&sock_path);
    }

    #[test]
    fn listener_without_peer_is_not_connected() {
        let sock_path = make_sock_path("nopeer");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        assert!(matches!(server.recv(), Err(ChannelError::NotConnected)));
        assert!(!server.is_closed());
        assert_eq!(server.address(), format!("unix:{}", sock_path.display()));
        cleanup(&sock_path);
    }

    #[test]
    fn connect_without_listener_fails() {
        let sock_path = make_sock_path("nolistener");
        let err = UnixChannel::connect(&sock_path).expect_err("connect should fail");
        assert!(matches!(err, ChannelError::Transport(_)));
        cleanup(&sock_path);
    }

    #[test]
    fn bind_over_regular_file_fails() {
        let sock_path = make_sock_path("occupied");
        std::fs::write(&sock_path, b"not a socket").expect("file should be writable");
        let err = UnixChannel::bind(&sock_path).expect_err("bind should fail");
        assert!(matches!(err, ChannelError::Transport(_)));
        cleanup(&sock_path);
    }

    #[test]
    fn shutdown_handle_stops_waiting_listener() {
        let sock_path = make_sock_path("stopidle");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");
        let handle = server.shutdown_handle();

        let server_thread = thread::spawn(move || {
            let result = server.accept(&mut |message, response| echo_args(message, response));
            (result, server.is_closed())
        });

        thread::sleep(Duration::from_millis(50));
        handle.shutdown();
        assert!(handle.is_requested());

        let (result, closed) = server_thread.join().expect("server thread should finish");
        assert!(result.is_ok());
        assert!(closed);
        cleanup(&sock_path);
    }

    #[test]
    fn shutdown_handle_stops_active_loop() {
        let sock_path = make_sock_path("stopactive");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");
        let handle = server.shutdown_handle();

        let server_thread = thread::spawn(move || {
            let result = server.accept(&mut |message, response| echo_args(message, response));
            (result, server.is_closed())
        });

        let mut client = UnixChannel::connect(&sock_path).expect("client should connect");
        let request = Message::build_request(1, 1, 0, &(7u8,)).unwrap();
        client.call(&request).expect("call should succeed");

        handle.shutdown();
        let (result, closed) = server_thread.join().expect("server thread should finish");
        assert!(result.is_ok());
        assert!(closed);
        cleanup(&sock_path);
    }

    #[test]
    fn read_timeout_closes_channel() {
        let sock_path = make_sock_path("timeout");
        let server = UnixChannel::bind(&sock_path).expect("server should bind");

        let _client = UnixChannel::connect(&sock_path).expect("client should connect");
        let mut server = server
            .with_config(
                FrameConfig::default().with_read_timeout(Some(Duration::from_millis(20))),
            )
            .expect("config should apply");
        let err = server
            .accept(&mut |message, response| echo_args(message, response))
            .expect_err("idle peer should time out");
        assert!(err.is_timeout());
        assert!(server.is_closed());
        cleanup(&sock_path);
    }

    #[test]
    fn oversized_send_keeps_channel_open() {
        let sock_path = make_sock_path("oversized");
        let server = UnixChannel::bind(&sock_path).expect("server should bind");
        let accept_thread = thread::spawn(move || {
            let mut server = server;
            let _ = server.accept(&mut |message, response| echo_args(message, response));
        });

        let mut client = UnixChannel::connect(&sock_path)
            .and_then(|c| c.with_config(FrameConfig::default().with_max_frame_size(32)))
            .expect("client should connect");
        let big = Message::build_request(1, 1, 0, &(vec![0u8; 64],)).unwrap();
        assert!(matches!(
            client.send(&big),
            Err(ChannelError::FrameTooLarge { .. })
        ));
        assert!(!client.is_closed());

        let small = Message::build_request(2, 1, 0, &(1u8,)).unwrap();
        client.call(&small).expect("small call should succeed");

        client.close();
        accept_thread.join().expect("server thread should finish");
        cleanup(&sock_path);
    }

    #[test]
    fn boxed_channels_from_free_functions() {
        let sock_path = make_sock_path("boxed");
        let mut server = bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            server
                .accept(&mut |message, response| echo_args(message, response))
                .expect("accept should end cleanly");
        });

        let mut client = connect(&sock_path).expect("client should connect");
        let request = Message::build_request(3, 1, 0, &("hi",)).unwrap();
        let reply = client.call(&request).expect("call should succeed");
        assert_eq!(reply.return_value().unwrap().decode::<String>().unwrap(), "hi");

        drop(client);
        server_thread.join().expect("server thread should finish");
        cleanup(&sock_path);
    }

    #[test]
    fn raw_stream_peer_gets_framed_reply() {
        let sock_path = make_sock_path("raw");
        let mut server = UnixChannel::bind(&sock_path).expect("server should bind");

        let server_thread = thread::spawn(move || {
            server
                .accept(&mut |message, response| echo_args(message, response))
                .expect("accept should end cleanly");
        });

        let mut stream = UnixDomainSocket::connect(&sock_path).expect("stream should connect");
        let request = Message::build_request(0x0102, 7, 0, &(0xBEEFu16,)).unwrap();
        let mut wire = (request.len() as u32).to_le_bytes().to_vec();
        wire.extend_from_slice(request.as_bytes());
        stream.write_all(&wire).expect("write should succeed");

        let mut reader = FrameReader::new(stream.try_clone().unwrap());
        let frame = reader.read_frame().expect("reply should arrive");
        assert_eq!(frame.as_ref(), &[0x43, 0x02, 0x02, 0x01, 0xEF, 0xBE]);

        stream.shutdown(Shutdown::Both).unwrap();
        server_thread.join().expect("server thread should finish");
        cleanup(&sock_path);
    }
}
