use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::IpcStream;

/// Device and inode of the socket file this listener created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SocketIdentity {
    dev: u64,
    ino: u64,
}

impl SocketIdentity {
    fn of(metadata: &std::fs::Metadata) -> Self {
        Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        }
    }
}

/// Listening Unix domain socket bound to a filesystem path.
///
/// The socket file is removed on drop, unless something else has replaced
/// it in the meantime.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    identity: Option<SocketIdentity>,
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

    /// Capacity of `sockaddr_un.sun_path`.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen at `path` with [`Self::DEFAULT_SOCKET_MODE`].
    ///
    /// A stale socket file at `path` is replaced. Binding fails with
    /// `AddrInUse` if a listener still accepts connections there, and any
    /// other kind of file is left alone.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind and listen at `path`, applying `mode` to the socket file.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        check_path_len(&path, Self::MAX_PATH_LEN)?;
        remove_stale_socket(&path)?;

        let bind_err = |source| TransportError::Bind {
            path: path.clone(),
            source,
        };
        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .map_err(bind_err)?;
        let metadata = std::fs::symlink_metadata(&path).map_err(bind_err)?;

        info!(
            ?path,
            mode = format_args!("{mode:o}"),
            "listening on unix domain socket"
        );

        Ok(Self {
            listener,
            identity: Some(SocketIdentity::of(&metadata)),
            path,
        })
    }

    /// Wait for the next incoming connection.
    pub fn accept(&self) -> Result<IpcStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        let stream = IpcStream::from_unix(stream);
        match stream.peer_credentials() {
            Some((uid, gid, pid)) => {
                debug!(path = ?self.path, uid, gid, pid, "accepted connection")
            }
            None => debug!(path = ?self.path, "accepted connection"),
        }
        Ok(stream)
    }

    /// Connect to a listener at `path`.
    pub fn connect(path: impl AsRef<Path>) -> Result<IpcStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| TransportError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(IpcStream::from_unix(stream))
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for UnixDomainSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnixDomainSocket")
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        let Some(expected) = self.identity else {
            return;
        };
        let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        if metadata.file_type().is_socket() && SocketIdentity::of(&metadata) == expected {
            debug!(path = ?self.path, "removing socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path was replaced; leaving it in place");
        }
    }
}

fn check_path_len(path: &Path, max: usize) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= max {
        return Err(TransportError::PathTooLong {
            path: path.to_path_buf(),
            len,
            max,
        });
    }
    Ok(())
}

fn remove_stale_socket(path: &Path) -> Result<()> {
    let bind_err = |source| TransportError::Bind {
        path: path.to_path_buf(),
        source,
    };
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(bind_err(err)),
    };
    if !metadata.file_type().is_socket() {
        return Err(bind_err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "existing path is not a unix socket",
        )));
    }
    match UnixStream::connect(path) {
        Ok(_) => Err(bind_err(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "socket path is already bound by a live listener",
        ))),
        Err(err) if err.kind() == std::io::ErrorKind::ConnectionRefused => {
            debug!(?path, "removing stale socket");
            std::fs::remove_file(path).map_err(bind_err)
        }
        Err(err) => Err(bind_err(err)),
    }
}
