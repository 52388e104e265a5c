use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::errors::{CatError, CatResult};

/// A connected duplex text channel
#[async_trait]
pub trait Connection: Send {
    async fn send(&mut self, text: String) -> CatResult<()>;

    /// Next text frame, or `None` once the peer has ended the stream
    async fn receive(&mut self) -> CatResult<Option<String>>;

    /// Close the channel. Closing twice is a no-op.
    async fn close(&mut self) -> CatResult<()>;
}

/// Opens connections to a target such as a WebSocket URL
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    async fn connect(&self, target: &str) -> CatResult<Self::Connection>;
}

static CRYPTO_PROVIDER: Once = Once::new();

/// rustls needs a process-wide crypto provider before the first `wss://` handshake
fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Err means another provider is already installed
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// WebSocket transport backed by tokio-tungstenite
#[derive(Debug, Clone, Default)]
pub struct WsConnector {
    connect_timeout: Option<Duration>,
}

impl WsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self, target: &str) -> CatResult<WsConnection> {
        install_crypto_provider();

        let handshake = tokio_tungstenite::connect_async(target);
        let result = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, handshake)
                .await
                .map_err(|_| CatError::transport(format!("connection to {} timed out", target)))?,
            None => handshake.await,
        };

        let (stream, response) =
            result.map_err(|e| CatError::transport(format!("failed to connect: {}", e)))?;
        debug!(status = %response.status(), "websocket connected");

        Ok(WsConnection {
            stream,
            closed: false,
        })
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, text: String) -> CatResult<()> {
        self.stream
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| CatError::transport(format!("failed to send message: {}", e)))
    }

    async fn receive(&mut self) -> CatResult<Option<String>> {
        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    return Err(CatError::transport(format!("failed to receive message: {}", e)))
                }
                None => return Ok(None),
            };

            match message {
                WsMessage::Text(text) => return Ok(Some(text)),
                WsMessage::Binary(bytes) => {
                    let text = String::from_utf8(bytes).map_err(|e| {
                        CatError::transport(format!("received a non UTF-8 frame: {}", e))
                    })?;
                    return Ok(Some(text));
                }
                WsMessage::Close(frame) => {
                    debug!(?frame, "websocket closed by server");
                    self.closed = true;
                    return Ok(None);
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> CatResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(CatError::transport(format!("failed to close: {}", e))),
        }
    }
}
