//! Byte-stream endpoints for the three agent channels.
//!
//! Each channel listens on its own endpoint and accepts exactly one peer.
//! Endpoints are either TCP addresses or Unix socket paths.

use crate::error::{Channel, ChannelError, ChannelOp};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, instrument, warn};

/// A bidirectional byte stream usable as a channel.
pub trait ByteStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> ByteStream for T {}

/// Type-erased channel stream.
pub type BoxedStream = Box<dyn ByteStream>;

/// Where a channel listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Endpoint {
    /// A TCP address, written `tcp://host:port` or `host:port`.
    Tcp(SocketAddr),
    /// A Unix domain socket path, written `unix:///path/to/socket`.
    Unix(PathBuf),
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err("unix endpoint needs a path".to_string());
            }
            return Ok(Endpoint::Unix(PathBuf::from(path)));
        }

        let addr = s.strip_prefix("tcp://").unwrap_or(s);
        if let Ok(parsed) = addr.parse::<SocketAddr>() {
            return Ok(Endpoint::Tcp(parsed));
        }

        addr.to_socket_addrs()
            .map_err(|e| format!("invalid endpoint '{}': {}", s, e))?
            .next()
            .map(Endpoint::Tcp)
            .ok_or_else(|| format!("endpoint '{}' resolved to no address", s))
    }
}

impl TryFrom<String> for Endpoint {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

impl Endpoint {
    /// TCP endpoint on 127.0.0.1.
    pub fn loopback(port: u16) -> Self {
        Endpoint::Tcp(SocketAddr::from(([127, 0, 0, 1], port)))
    }

    /// Starts listening on this endpoint.
    ///
    /// An existing Unix socket file at the path is replaced. Any other kind
    /// of file there is left alone and the bind fails.
    #[instrument(skip(self), fields(endpoint = %self))]
    pub async fn bind(&self, channel: Channel) -> Result<Listener, ChannelError> {
        match self {
            Endpoint::Tcp(addr) => TcpListener::bind(addr)
                .await
                .map(Listener::Tcp)
                .map_err(|e| ChannelError::io(channel, ChannelOp::Bind, e)),
            Endpoint::Unix(path) => bind_unix(channel, path),
        }
    }

    /// Opens a connection to a listening endpoint.
    #[instrument(skip(self), fields(endpoint = %self))]
    pub async fn connect(&self, channel: Channel) -> Result<BoxedStream, ChannelError> {
        match self {
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr)
                    .await
                    .map_err(|e| ChannelError::io(channel, ChannelOp::Connect, e))?;
                stream
                    .set_nodelay(true)
                    .map_err(|e| ChannelError::io(channel, ChannelOp::Connect, e))?;
                Ok(Box::new(stream))
            }
            Endpoint::Unix(path) => connect_unix(channel, path).await,
        }
    }
}

#[cfg(unix)]
fn bind_unix(channel: Channel, path: &std::path::Path) -> Result<Listener, ChannelError> {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            debug!(path = %path.display(), "Removing stale socket file");
            std::fs::remove_file(path)
                .map_err(|e| ChannelError::io(channel, ChannelOp::Bind, e))?;
        }
        Ok(_) => {
            return Err(ChannelError::new(
                channel,
                ChannelOp::Bind,
                format!("{} exists and is not a socket", path.display()),
            ));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ChannelError::io(channel, ChannelOp::Bind, e)),
    }
    tokio::net::UnixListener::bind(path)
        .map(|listener| Listener::Unix(listener, path.to_path_buf()))
        .map_err(|e| ChannelError::io(channel, ChannelOp::Bind, e))
}

#[cfg(not(unix))]
fn bind_unix(channel: Channel, _path: &std::path::Path) -> Result<Listener, ChannelError> {
    Err(ChannelError::new(
        channel,
        ChannelOp::Bind,
        "unix socket endpoints are not supported on this platform",
    ))
}

#[cfg(unix)]
async fn connect_unix(
    channel: Channel,
    path: &std::path::Path,
) -> Result<BoxedStream, ChannelError> {
    let stream = tokio::net::UnixStream::connect(path)
        .await
        .map_err(|e| ChannelError::io(channel, ChannelOp::Connect, e))?;
    Ok(Box::new(stream))
}

#[cfg(not(unix))]
async fn connect_unix(
    channel: Channel,
    _path: &std::path::Path,
) -> Result<BoxedStream, ChannelError> {
    Err(ChannelError::new(
        channel,
        ChannelOp::Connect,
        "unix socket endpoints are not supported on this platform",
    ))
}

/// A bound endpoint waiting for its peer.
#[derive(Debug)]
pub enum Listener {
    /// TCP listener.
    Tcp(TcpListener),
    /// Unix listener and the socket path it owns.
    #[cfg(unix)]
    Unix(tokio::net::UnixListener, PathBuf),
}

impl Listener {
    /// The endpoint a peer should connect to, with any port 0 resolved.
    pub fn local_endpoint(&self, channel: Channel) -> Result<Endpoint, ChannelError> {
        match self {
            Listener::Tcp(listener) => listener
                .local_addr()
                .map(Endpoint::Tcp)
                .map_err(|e| ChannelError::io(channel, ChannelOp::Bind, e)),
            #[cfg(unix)]
            Listener::Unix(_, path) => Ok(Endpoint::Unix(path.clone())),
        }
    }

    /// Accepts exactly one peer and stops listening.
    ///
    /// A Unix socket file is removed once its peer is connected.
    #[instrument(skip(self))]
    pub async fn accept(self, channel: Channel) -> Result<BoxedStream, ChannelError> {
        match self {
            Listener::Tcp(listener) => {
                let (stream, peer) = listener
                    .accept()
                    .await
                    .map_err(|e| ChannelError::io(channel, ChannelOp::Accept, e))?;
                stream
                    .set_nodelay(true)
                    .map_err(|e| ChannelError::io(channel, ChannelOp::Accept, e))?;
                debug!(%peer, "Accepted TCP peer");
                Ok(Box::new(stream))
            }
            #[cfg(unix)]
            Listener::Unix(listener, path) => {
                let (stream, _) = listener
                    .accept()
                    .await
                    .map_err(|e| ChannelError::io(channel, ChannelOp::Accept, e))?;
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to remove socket file");
                }
                debug!(path = %path.display(), "Accepted Unix peer");
                Ok(Box::new(stream))
            }
        }
    }
}

/// The three endpoints serving one agent seat.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_new::new)]
pub struct AgentEndpoints {
    /// Engine to agent: state before each move.
    state: Endpoint,
    /// Agent to engine: the chosen move.
    action: Endpoint,
    /// Engine to agent: move accepted or refused.
    result: Endpoint,
}

impl AgentEndpoints {
    /// Loopback TCP endpoints on three consecutive ports starting at `base`.
    ///
    /// Returns `None` when `base + 2` does not fit in a port number.
    pub fn loopback(base: u16) -> Option<Self> {
        let at = |offset: u16| base.checked_add(offset).map(Endpoint::loopback);
        Some(Self::new(at(0)?, at(1)?, at(2)?))
    }

    /// Binds all three listeners. Nothing is accepted yet.
    ///
    /// State is bound last, so an agent that reaches it finds the other
    /// two already listening.
    #[instrument(
        skip(self),
        fields(state = %self.state, action = %self.action, result = %self.result)
    )]
    pub async fn bind(&self) -> Result<ChannelListeners, ChannelError> {
        let result = self.result.bind(Channel::Result).await?;
        let action = self.action.bind(Channel::Action).await?;
        let state = self.state.bind(Channel::State).await?;
        Ok(ChannelListeners {
            state,
            action,
            result,
        })
    }

    /// Connects to all three channels from the agent side.
    #[instrument(
        skip(self),
        fields(state = %self.state, action = %self.action, result = %self.result)
    )]
    pub async fn connect(&self) -> Result<AgentConnection, ChannelError> {
        let state = self.state.connect(Channel::State).await?;
        let action = self.action.connect(Channel::Action).await?;
        let result = self.result.connect(Channel::Result).await?;
        Ok(AgentConnection {
            state,
            action,
            result,
        })
    }
}

/// Bound listeners for one agent seat.
#[derive(Debug)]
pub struct ChannelListeners {
    state: Listener,
    action: Listener,
    result: Listener,
}

impl ChannelListeners {
    /// The endpoints an agent should connect to.
    pub fn local_endpoints(&self) -> Result<AgentEndpoints, ChannelError> {
        Ok(AgentEndpoints::new(
            self.state.local_endpoint(Channel::State)?,
            self.action.local_endpoint(Channel::Action)?,
            self.result.local_endpoint(Channel::Result)?,
        ))
    }

    /// Accepts one peer per channel, in state, action, result order.
    #[instrument(skip(self))]
    pub async fn accept(self) -> Result<AgentConnection, ChannelError> {
        let state = self.state.accept(Channel::State).await?;
        let action = self.action.accept(Channel::Action).await?;
        let result = self.result.accept(Channel::Result).await?;
        info!("Agent connected on all channels");
        Ok(AgentConnection {
            state,
            action,
            result,
        })
    }
}

/// Connected streams for the three channels of one agent seat.
///
/// The same type serves both ends; each side reads and writes the
/// channels its role calls for.
pub struct AgentConnection {
    /// State channel stream.
    pub state: BoxedStream,
    /// Action channel stream.
    pub action: BoxedStream,
    /// Result channel stream.
    pub result: BoxedStream,
}

impl AgentConnection {
    /// Wraps three already-connected streams.
    pub fn new(
        state: impl ByteStream + 'static,
        action: impl ByteStream + 'static,
        result: impl ByteStream + 'static,
    ) -> Self {
        Self {
            state: Box::new(state),
            action: Box::new(action),
            result: Box::new(result),
        }
    }

    /// Two connected in-memory ends: `(engine side, agent side)`.
    pub fn pair(capacity: usize) -> (Self, Self) {
        let (engine_state, agent_state) = tokio::io::duplex(capacity);
        let (engine_action, agent_action) = tokio::io::duplex(capacity);
        let (engine_result, agent_result) = tokio::io::duplex(capacity);
        (
            Self::new(engine_state, engine_action, engine_result),
            Self::new(agent_state, agent_action, agent_result),
        )
    }
}

impl std::fmt::Debug for AgentConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConnection").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints() {
        assert_eq!(
            "tcp://127.0.0.1:8000".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp(SocketAddr::from(([127, 0, 0, 1], 8000)))
        );
        assert_eq!(
            "127.0.0.1:8001".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp(SocketAddr::from(([127, 0, 0, 1], 8001)))
        );
        assert_eq!(
            "unix:///tmp/uttt.state".parse::<Endpoint>().unwrap(),
            Endpoint::Unix(PathBuf::from("/tmp/uttt.state"))
        );
        assert!("unix://".parse::<Endpoint>().is_err());
        assert!("not an endpoint".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let endpoint = Endpoint::Tcp(SocketAddr::from(([127, 0, 0, 1], 8002)));
        assert_eq!(endpoint.to_string().parse::<Endpoint>().unwrap(), endpoint);
    }

    #[test]
    fn test_loopback_ports() {
        let endpoints = AgentEndpoints::loopback(9000).unwrap();
        assert_eq!(endpoints.result().to_string(), "tcp://127.0.0.1:9002");
    }

    #[test]
    fn test_loopback_ports_stay_in_range() {
        let top = AgentEndpoints::loopback(u16::MAX - 2).unwrap();
        assert_eq!(top.result(), &Endpoint::loopback(u16::MAX));
        assert!(AgentEndpoints::loopback(u16::MAX - 1).is_none());
        assert!(AgentEndpoints::loopback(u16::MAX).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bind_keeps_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "keep me").unwrap();

        let err = Endpoint::Unix(path.clone())
            .bind(Channel::State)
            .await
            .unwrap_err();
        assert_eq!(err.channel, Channel::State);
        assert_eq!(err.operation, ChannelOp::Bind);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bind_replaces_stale_socket() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = Endpoint::Unix(dir.path().join("state.sock"));

        // Dropping a listener leaves its socket file behind.
        drop(endpoint.bind(Channel::State).await.unwrap());
        assert!(dir.path().join("state.sock").exists());

        let listener = endpoint.bind(Channel::State).await.unwrap();
        assert_eq!(listener.local_endpoint(Channel::State).unwrap(), endpoint);
    }

    #[tokio::test]
    async fn test_bind_failure_names_channel() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let free = Endpoint::Tcp(SocketAddr::from(([127, 0, 0, 1], 0)));
        let endpoints = AgentEndpoints::new(free.clone(), Endpoint::Tcp(addr), free);
        let err = endpoints.bind().await.unwrap_err();
        assert_eq!(err.channel, Channel::Action);
        assert_eq!(err.operation, ChannelOp::Bind);
    }
}
