//! WebSocket transport
//!
//! Connects to a single peer. Requests go out as text frames and the next
//! text or binary frame from the peer is taken as the reply, so at most one
//! call is in flight at a time. The destination is only recorded in traces:
//! the URL already fixes the peer.
//!
//! A caller that gives up (for example because the session timeout fired)
//! leaves its request outstanding. The peer answers in order, so the next
//! call skips one reply per abandoned request before taking its own.
//! Frames nobody asked for are discarded before each request is written.

use super::{Transport, TransportError};
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type ReplyResult = Result<Vec<u8>, TransportError>;

struct ReplyQueue {
    rx: mpsc::UnboundedReceiver<ReplyResult>,
    // Requests written whose reply has not been consumed yet.
    outstanding: usize,
}

/// Transport over one WebSocket connection
pub struct WsTransport {
    url: String,
    sink: Mutex<WsSink>,
    replies: Mutex<ReplyQueue>,
    reader: JoinHandle<()>,
}

impl WsTransport {
    /// Open the connection
    #[tracing::instrument]
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        tracing::info!("Connecting to peer");
        let (stream, _) = connect_async(url).await.map_err(map_ws_error)?;
        let (sink, source) = stream.split();

        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            let mut source = source;
            while let Some(frame) = source.next().await {
                let reply = match frame {
                    Ok(Message::Text(text)) => Ok(text.into_bytes()),
                    Ok(Message::Binary(bytes)) => Ok(bytes),
                    Ok(Message::Close(_)) => {
                        Err(TransportError::Shutdown("peer closed the connection".to_string()))
                    }
                    Ok(_) => continue,
                    Err(e) => Err(map_ws_error(e)),
                };
                let closing = reply.is_err();
                if tx.send(reply).is_err() || closing {
                    break;
                }
            }
            tracing::debug!("WebSocket reader finished");
        });

        tracing::info!("Connected");
        Ok(Self {
            url: url.to_string(),
            sink: Mutex::new(sink),
            replies: Mutex::new(ReplyQueue { rx, outstanding: 0 }),
            reader,
        })
    }

    /// URL this transport is connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a close frame to the peer
    pub async fn close(&self) -> Result<(), TransportError> {
        self.sink.lock().await.close().await.map_err(map_ws_error)
    }

    async fn write(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        let message = match String::from_utf8(payload) {
            Ok(text) => Message::Text(text),
            Err(e) => Message::Binary(e.into_bytes()),
        };
        self.sink.lock().await.send(message).await.map_err(map_ws_error)
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, destination: &str, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        // Holding the queue for the whole exchange keeps calls one at a time.
        let mut queue = self.replies.lock().await;
        while let Ok(stale) = queue.rx.try_recv() {
            stale?;
            queue.outstanding = queue.outstanding.saturating_sub(1);
            tracing::debug!(destination, "Discarding reply of an abandoned call");
        }

        // Counted before the write: if this future is dropped from here on,
        // the request stays outstanding and its reply is skipped later.
        queue.outstanding += 1;
        if let Err(e) = self.write(request).await {
            queue.outstanding -= 1;
            return Err(e);
        }
        tracing::debug!(destination, "Request written, waiting for reply");

        loop {
            let reply = match queue.rx.recv().await {
                Some(reply) => reply?,
                None => return Err(TransportError::Shutdown("connection closed".to_string())),
            };
            queue.outstanding -= 1;
            if queue.outstanding == 0 {
                return Ok(reply);
            }
            tracing::debug!(destination, "Skipping late reply of an abandoned call");
        }
    }

    async fn publish(&self, destination: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        tracing::debug!(destination, "Publishing");
        self.write(payload).await
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn map_ws_error(err: tungstenite::Error) -> TransportError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TransportError::Shutdown(err.to_string())
        }
        other => TransportError::Io(other.to_string()),
    }
}
