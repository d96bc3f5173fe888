//! Handshake integration tests
//!
//! `system.describe` on connect, explicit re-description, and the failure
//! paths that leave a session in `Failed`.

mod common;

use common::{calculator_transport, failure, success};
use jrmt_client::{MemoryTransport, RpcSession, SessionBuilder, SessionConfig, SessionState};
use jrmt_core::{Error, TypeTag};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_connect_caches_description() {
    let transport = calculator_transport();
    let session = RpcSession::connect(transport.clone(), "rpc.calculator").await.unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    let description = session.service_description().unwrap();
    assert_eq!(description.name.as_deref(), Some("calculator"));
    assert_eq!(description.sdversion.as_deref(), Some("1.0"));
    assert_eq!(description.len(), 7);

    let add = description.get_procedure("add", 2).unwrap();
    assert_eq!(add.return_type(), "num");
    assert_eq!(add.params[0].type_tag().unwrap(), TypeTag::Num);

    // Exactly one handshake call.
    let sent = transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].json().unwrap(),
        json!({"method": "system.describe", "params": [], "id": null, "jsonrpc": "1.1"})
    );
}

#[tokio::test]
async fn test_procedure_lookup_by_arity() {
    let session = RpcSession::connect(calculator_transport(), "rpc.calculator").await.unwrap();
    let description = session.service_description().unwrap();

    assert!(description.get_procedure("add", 2).is_ok());
    match description.get_procedure("add", 3) {
        Err(Error::ProcedureNotFound { name, arity }) => {
            assert_eq!(name, "add");
            assert_eq!(arity, 3);
        }
        other => panic!("expected ProcedureNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_handshake_timeout_fails_session() {
    let config = SessionConfig::default().with_timeout(Duration::from_millis(100));
    let mut session = RpcSession::new(MemoryTransport::silent(), "rpc.void", config);

    let result = session.describe().await;
    assert!(matches!(result, Err(Error::Timeout)));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.service_description().is_none());
}

#[tokio::test]
async fn test_connect_propagates_timeout() {
    let result = SessionBuilder::new(MemoryTransport::silent(), "rpc.void")
        .timeout(Duration::from_millis(100))
        .connect()
        .await;
    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test]
async fn test_handshake_shutdown_fails_session() {
    let transport = MemoryTransport::silent();
    let mut session = RpcSession::new(transport.clone(), "rpc.void", SessionConfig::default());

    let closer = transport.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        closer.shut_down("connection reset");
    });

    match session.describe().await {
        Err(Error::Io(msg)) => assert!(msg.contains("connection reset")),
        other => panic!("expected Io, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_remote_describe_error() {
    let transport = MemoryTransport::new(|_, _| Some(failure(501, "introspection disabled")));
    let mut session = RpcSession::new(transport, "rpc.closed", SessionConfig::default());

    match session.describe().await {
        Err(Error::Remote(payload)) => {
            assert_eq!(payload.code(), Some(501));
            assert_eq!(payload.name(), Some("JSONRPCError"));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_description_without_procs_is_malformed() {
    let transport = MemoryTransport::new(|_, _| Some(success(json!({"name": "empty"}))));
    let mut session = RpcSession::new(transport, "rpc.empty", SessionConfig::default());

    assert!(matches!(
        session.describe().await,
        Err(Error::MalformedDescription(_))
    ));
    assert_eq!(session.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_describe_after_connect_without_handshake() {
    let transport = calculator_transport();
    let config = SessionConfig::default().with_describe_on_connect(false);
    let mut session = SessionBuilder::new(transport, "rpc.calculator")
        .config(config)
        .connect()
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Unconnected);

    session.describe().await.unwrap();
    assert!(session.state().is_ready());
    assert!(session.service_description().unwrap().contains("log", 1));
}

#[tokio::test]
async fn test_version_tagging_disabled_on_handshake() {
    let transport = calculator_transport();
    SessionBuilder::new(transport.clone(), "rpc.calculator")
        .version_tagging(false)
        .connect()
        .await
        .unwrap();

    let request = transport.sent().await[0].json().unwrap();
    assert_eq!(request, json!({"method": "system.describe", "params": [], "id": null}));
}
