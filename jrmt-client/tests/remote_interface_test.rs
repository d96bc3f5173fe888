//! Integration tests for `#[remote_interface]` proxies

use jrmt_client::{MemoryTransport, RemoteInterface, ReturnKind, RpcSession, SessionConfig};
use jrmt_core::Error;
use jrmt_macros::remote_interface;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: i64,
    y: i64,
}

#[remote_interface]
pub trait Geometry {
    /// Add two numbers
    fn add(&self, a: i64, b: i64) -> i64;

    fn translate(&self, point: Point, dx: i64, dy: i64) -> Point;

    #[rpc(name = "system.log")]
    fn log(&self, line: String);

    fn reset(&self) -> ();
}

fn geometry_peer() -> MemoryTransport {
    MemoryTransport::new(|_, request| {
        let params = request["params"].as_array()?;
        match request["method"].as_str()? {
            "add" => Some(json!({"result": params[0].as_i64()? + params[1].as_i64()?})),
            "translate" => {
                let point = &params[0];
                Some(json!({"result": {
                    "x": point["x"].as_i64()? + params[1].as_i64()?,
                    "y": point["y"].as_i64()? + params[2].as_i64()?,
                }}))
            }
            "fail" => Some(json!({"error": {"code": 1, "message": "boom"}})),
            _ => None,
        }
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_signatures_are_generated() {
    assert_eq!(GeometryProxy::NAME, "Geometry");
    let names: Vec<&str> = GeometryProxy::METHODS.iter().map(|sig| sig.name).collect();
    assert_eq!(names, vec!["add", "translate", "system.log", "reset"]);

    let add = GeometryProxy::signature("add").unwrap();
    assert_eq!(add.arity, 2);
    assert_eq!(add.returns, ReturnKind::Value);

    let log = GeometryProxy::signature("system.log").unwrap();
    assert_eq!(log.arity, 1);
    assert_eq!(log.returns, ReturnKind::Unit);

    assert_eq!(GeometryProxy::signature("reset").unwrap().returns, ReturnKind::Unit);
    assert!(GeometryProxy::signature("log").is_none());
}

#[tokio::test]
async fn test_proxy_calls_with_typed_results() {
    init_tracing();
    let session = RpcSession::new(geometry_peer(), "geometry", SessionConfig::default());
    let geometry = GeometryProxy::new(&session);

    assert_eq!(geometry.add(2, 40).await.unwrap(), 42);

    let moved = geometry.translate(Point { x: 1, y: 2 }, 10, 20).await.unwrap();
    assert_eq!(moved, Point { x: 11, y: 22 });
    assert_eq!(geometry.session().destination(), "geometry");
}

#[tokio::test]
async fn test_unit_methods_are_notifications() {
    let transport = geometry_peer();
    let session = RpcSession::new(transport.clone(), "geometry", SessionConfig::default());
    let geometry = GeometryProxy::new(&session);

    geometry.log("hello".to_string()).await.unwrap();
    geometry.reset().await.unwrap();

    let sent = transport.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|message| !message.expects_reply));

    let log: Value = sent[0].json().unwrap();
    assert_eq!(log["method"], "system.log");
    assert_eq!(log["params"], json!(["hello"]));
    assert!(log.get("id").is_none());
}

#[tokio::test]
async fn test_result_type_mismatch_is_serialization_error() {
    let transport = MemoryTransport::new(|_, _| Some(json!({"result": "not a number"})));
    let session = RpcSession::new(transport, "geometry", SessionConfig::default());
    let geometry = GeometryProxy::new(&session);

    assert!(matches!(
        geometry.add(1, 2).await,
        Err(Error::Serialization(_))
    ));
}

#[tokio::test]
async fn test_remote_errors_pass_through() {
    let transport = MemoryTransport::new(|_, _| {
        Some(json!({"error": {"name": "JSONRPCError", "code": 500, "message": "overflow"}}))
    });
    let session = RpcSession::new(transport, "geometry", SessionConfig::default());

    match GeometryProxy::new(&session).add(i64::MAX, 1).await {
        Err(Error::Remote(payload)) => assert_eq!(payload.message(), Some("overflow")),
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_procedures_against_description() {
    let transport = MemoryTransport::new(|_, request| match request["method"].as_str()? {
        "system.describe" => Some(json!({"result": {"procs": [
            {"name": "add", "params": [{"type": "num"}, {"type": "num"}]},
            {"name": "system.log", "params": [{"type": "str"}]}
        ]}})),
        _ => None,
    });
    let session = RpcSession::connect(transport, "geometry").await.unwrap();

    let description = session.service_description().unwrap();
    let missing: Vec<&str> = GeometryProxy::missing_procedures(description)
        .into_iter()
        .map(|sig| sig.name)
        .collect();
    assert_eq!(missing, vec!["translate", "reset"]);
}
