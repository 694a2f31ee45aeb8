//! End-to-end tests for the transport over TCP.

use ctl_rpc::observability::init_logging;
use ctl_rpc::{checker, BoxError, Client, ClientInfo, Error, Method, Params, Server, ServerInfo};

/// Register the three routes the auth matrix exercises.
fn register_test_routes(server: &mut Server) {
    server
        .handle(Method::GET, "/test/get", &["arg"], |params: &Params, body: &[u8]| {
            assert_eq!(params.get("arg"), Some("1"));
            assert!(body.is_empty());
            Ok(b"abc".to_vec())
        })
        .unwrap();
    server
        .handle(Method::PUT, "/test/put", &["arg"], |params: &Params, body: &[u8]| {
            assert_eq!(params.get("arg"), Some("2"));
            assert_eq!(body, b"abc");
            Ok(body[..2].to_vec())
        })
        .unwrap();
    server
        .handle(Method::POST, "/test/post", &["arg"], |params: &Params, body: &[u8]| {
            assert_eq!(params.get("arg"), Some("3"));
            assert_eq!(body, b"abc");
            Ok(body[..1].to_vec())
        })
        .unwrap();
}

#[tokio::test]
async fn authenticated_round_trip() {
    init_logging();

    let mut server = Server::new(
        ServerInfo::new("tcp://127.0.0.1:0"),
        Some(checker(|u, p| u == "u" && p == "p")),
    )
    .unwrap();
    register_test_routes(&mut server);
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    // no credentials: every method is rejected before the handler runs
    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    let err = client.get("/test/get?arg=1").await.unwrap_err();
    assert_eq!(err.to_string(), "[401] account unauthorized");
    let err = client.put(&[], "/test/put?arg=1").await.unwrap_err();
    assert_eq!(err.to_string(), "[401] account unauthorized");
    let err = client.post(&[], "/test/post?arg=1").await.unwrap_err();
    assert_eq!(err.to_string(), "[401] account unauthorized");

    // wrong password
    let client = Client::new(ClientInfo::new(&addr).with_credentials("u", "x")).unwrap();
    let err = client.get("/test/get?arg=1").await.unwrap_err();
    assert_eq!(err.to_string(), "[401] account unauthorized");

    // correct credentials
    let client = Client::new(ClientInfo::new(&addr).with_credentials("u", "p")).unwrap();
    let body = client.get(&format!("/test/get?arg={}", 1)).await.unwrap();
    assert_eq!(body, b"abc");
    let body = client
        .put(b"abc", &format!("/test/put?arg={}", 2))
        .await
        .unwrap();
    assert_eq!(body, b"ab");
    let body = client
        .post(b"abc", &format!("/test/post?arg={}", 3))
        .await
        .unwrap();
    assert_eq!(body, b"a");

    server.close().await;
}

#[tokio::test]
async fn no_checker_authorizes_everything() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(Method::GET, "/open", &[], |_p: &Params, _b: &[u8]| {
            Ok(b"ok".to_vec())
        })
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    assert_eq!(client.get("/open").await.unwrap(), b"ok");
    server.close().await;
}

#[tokio::test]
async fn path_placeholders_capture_segments() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(
            Method::GET,
            "/component/{name}/stats",
            &["verbose"],
            |params: &Params, _b: &[u8]| {
                let mut out = params.get("name").unwrap_or("?").to_string();
                if let Some(v) = params.get("verbose") {
                    out.push(':');
                    out.push_str(v);
                }
                Ok(out.into_bytes())
            },
        )
        .unwrap();
    // same-named query parameter loses to the path capture
    server
        .handle(
            Method::GET,
            "/component/{name}",
            &["name"],
            |params: &Params, _b: &[u8]| Ok(params.get("name").unwrap_or("?").as_bytes().to_vec()),
        )
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    assert_eq!(
        client.get("/component/broker/stats").await.unwrap(),
        b"broker"
    );
    assert_eq!(
        client
            .get("/component/broker/stats?verbose=true")
            .await
            .unwrap(),
        b"broker:true"
    );
    assert_eq!(
        client.get("/component/agent?name=shadow").await.unwrap(),
        b"agent"
    );
    server.close().await;
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(Method::GET, "/known", &[], |_p: &Params, _b: &[u8]| {
            Ok(Vec::new())
        })
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    match client.get("/unknown").await.unwrap_err() {
        Error::Status { code, .. } => assert_eq!(code, 404),
        other => panic!("expected status error, got {other}"),
    }
    // a registered path with the wrong method is no match either
    match client.post(b"x", "/known").await.unwrap_err() {
        Error::Status { code, .. } => assert_eq!(code, 404),
        other => panic!("expected status error, got {other}"),
    }
    server.close().await;
}

#[tokio::test]
async fn handler_errors_become_500_with_message() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(Method::GET, "/fail", &[], |_p: &Params, _b: &[u8]| {
            Err::<Vec<u8>, BoxError>("component not running".into())
        })
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    let err = client.get("/fail").await.unwrap_err();
    assert_eq!(err.to_string(), "[500] component not running");
    server.close().await;
}

#[tokio::test]
async fn echo_round_trips_arbitrary_bytes() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(Method::POST, "/echo", &[], |_p: &Params, body: &[u8]| {
            Ok(body.to_vec())
        })
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    let payload: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    assert_eq!(client.post(&payload, "/echo").await.unwrap(), payload);

    // empty bodies survive both directions
    assert_eq!(client.post(&[], "/echo").await.unwrap(), Vec::<u8>::new());
    server.close().await;
}

#[tokio::test]
async fn structured_payloads_pass_through_opaquely() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(Method::GET, "/inspect", &[], |_p: &Params, _b: &[u8]| {
            let stats = serde_json::json!({
                "services": { "broker": { "instances": 1 } },
                "error": "",
            });
            Ok(serde_json::to_vec(&stats)?)
        })
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    let body = client.get("/inspect").await.unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["services"]["broker"]["instances"], 1);
    server.close().await;
}

#[tokio::test]
async fn close_stops_accepting_connections() {
    let mut server = Server::new(ServerInfo::new("tcp://127.0.0.1:0"), None).unwrap();
    server
        .handle(Method::GET, "/ok", &[], |_p: &Params, _b: &[u8]| {
            Ok(Vec::new())
        })
        .unwrap();
    server.start().await.unwrap();
    let addr = server.address().unwrap().to_string();

    let client = Client::new(ClientInfo::new(&addr)).unwrap();
    client.get("/ok").await.unwrap();

    server.close().await;
    server.close().await;

    match client.get("/ok").await.unwrap_err() {
        Error::Transport(_) => {}
        other => panic!("expected transport error, got {other}"),
    }
}
