//! Common test utilities for jrmt-client integration tests
//!
//! Scripted peers for [`MemoryTransport`] and a mock WebSocket peer for
//! [`WsTransport`](jrmt_client::WsTransport), so sessions can be tested
//! without a broker.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use jrmt_client::MemoryTransport;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// `system.describe` result for the calculator service
pub fn calculator_description() -> Value {
    json!({
        "sdversion": "1.0",
        "name": "calculator",
        "id": "urn:uuid:calculator",
        "summary": "Arithmetic over JSON-RPC",
        "procs": [
            {"name": "add", "params": [
                {"name": "a", "type": "num"},
                {"name": "b", "type": "num"}
            ], "return": {"type": "num"}},
            {"name": "negate", "params": [{"name": "flag", "type": "bit"}], "return": {"type": "bit"}},
            {"name": "concat", "params": [
                {"name": "a", "type": "str"},
                {"name": "b", "type": "str"}
            ], "return": {"type": "str"}},
            {"name": "sum", "params": [{"name": "values", "type": "arr"}], "return": {"type": "num"}},
            {"name": "keys", "params": [{"name": "object", "type": "obj"}], "return": {"type": "arr"}},
            {"name": "divide", "params": [
                {"name": "a", "type": "num"},
                {"name": "b", "type": "num"}
            ], "return": {"type": "num"}},
            {"name": "log", "params": [{"name": "line", "type": "str"}]}
        ]
    })
}

/// Reply envelope carrying `result`
pub fn success(result: Value) -> Value {
    json!({"result": result})
}

/// Reply envelope carrying an error object
pub fn failure(code: i64, message: &str) -> Value {
    json!({"error": {"name": "JSONRPCError", "code": code, "message": message}})
}

/// Answer a decoded request as the calculator service would
pub fn calculator_reply(request: &Value) -> Option<Value> {
    let params = request["params"].as_array()?;
    let reply = match request["method"].as_str()? {
        "system.describe" => success(calculator_description()),
        "add" => success(json!(params[0].as_f64()? + params[1].as_f64()?)),
        "negate" => success(json!(!params[0].as_bool()?)),
        "concat" => success(json!(format!("{}{}", params[0].as_str()?, params[1].as_str()?))),
        "sum" => success(json!(params[0]
            .as_array()?
            .iter()
            .filter_map(Value::as_f64)
            .sum::<f64>())),
        "keys" => success(json!(params[0].as_object()?.keys().collect::<Vec<_>>())),
        "divide" => match params[1].as_f64()? {
            d if d == 0.0 => failure(500, "division by zero"),
            d => success(json!(params[0].as_f64()? / d)),
        },
        _ => failure(404, "procedure not found"),
    };
    Some(reply)
}

/// In-process calculator peer
pub fn calculator_transport() -> MemoryTransport {
    MemoryTransport::new(|_, request| calculator_reply(request))
}

/// What the mock WebSocket peer does with an incoming frame
pub enum PeerAction {
    /// Send this text frame back
    Reply(String),
    /// Send this text frame back after a pause
    ReplyAfter(String, std::time::Duration),
    /// Stay silent
    Ignore,
    /// Close the connection
    Close,
}

/// Mock WebSocket peer for transport testing
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    message_rx: mpsc::Receiver<String>,
}

impl MockWsServer {
    /// Peer answering as the calculator service
    pub async fn calculator() -> Self {
        Self::with_handler(|text| {
            let request: Value = match serde_json::from_str(&text) {
                Ok(request) => request,
                Err(_) => return PeerAction::Ignore,
            };
            // Notifications carry no id and get no reply.
            if request.get("id").is_none() {
                return PeerAction::Ignore;
            }
            match calculator_reply(&request) {
                Some(reply) => PeerAction::Reply(reply.to_string()),
                None => PeerAction::Ignore,
            }
        })
        .await
    }

    /// Start a peer that handles each text frame with `handler`
    pub async fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(String) -> PeerAction + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (msg_tx, msg_rx) = mpsc::channel::<String>(100);
        let handler = Arc::new(handler);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let msg_tx = msg_tx.clone();
                        let handler = handler.clone();

                        tokio::spawn(async move {
                            let Ok(ws_stream) = accept_async(stream).await else { return };
                            let (mut write, mut read) = ws_stream.split();

                            while let Some(Ok(frame)) = read.next().await {
                                let Message::Text(text) = frame else { continue };
                                let _ = msg_tx.send(text.clone()).await;

                                match handler(text) {
                                    PeerAction::Reply(reply) => {
                                        let _ = write.send(Message::Text(reply)).await;
                                    }
                                    PeerAction::ReplyAfter(reply, delay) => {
                                        tokio::time::sleep(delay).await;
                                        let _ = write.send(Message::Text(reply)).await;
                                    }
                                    PeerAction::Ignore => {}
                                    PeerAction::Close => {
                                        let _ = write.close().await;
                                        break;
                                    }
                                }
                            }
                        });
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            message_rx: msg_rx,
        }
    }

    /// WebSocket URL of this peer
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Next frame the peer received, decoded as JSON
    pub async fn wait_for_message(&mut self) -> Option<Value> {
        let text = tokio::time::timeout(std::time::Duration::from_secs(5), self.message_rx.recv())
            .await
            .ok()
            .flatten()?;
        serde_json::from_str(&text).ok()
    }

    /// Stop accepting connections
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
