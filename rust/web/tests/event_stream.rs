mod common;

use common::{call, create, known_slots, routes};
use pairs_web::events::GameEvent;
use pairs_web::server::{ServerConfig, WebServer};
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use warp::http::StatusCode;

fn drain(sub: &mut pairs_web::events::EventSubscription) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = sub.receiver().try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn mismatch_streams_shake_then_conceal_after_delay() {
    let (ctx, routes) = routes();
    let id = create(&routes, 21).await;
    let (_, (a, b)) = known_slots(21);
    let mut sub = ctx.event_bus().subscribe(id.clone());

    let path = format!("/api/sessions/{id}/selections");
    call(&routes, "POST", &path, Some(json!({ "slot": a }))).await;
    let (_, body) = call(&routes, "POST", &path, Some(json!({ "slot": b }))).await;
    assert_eq!(body["result"]["outcome"], "mismatched");
    assert_eq!(body["result"]["conceal_after_ms"], 1000);

    let kinds: Vec<&str> = drain(&mut sub).iter().map(GameEvent::kind).collect();
    assert_eq!(
        kinds,
        ["card_revealed", "card_revealed", "tries_changed", "mismatch"]
    );

    // Input is locked while the pair is up.
    let (_, blocked) = call(&routes, "POST", &path, Some(json!({ "slot": 51 }))).await;
    assert_eq!(blocked["result"]["reason"], "resolution_pending");
    assert!(drain(&mut sub).is_empty());

    tokio::time::sleep(Duration::from_millis(1001)).await;
    let concealed: Vec<usize> = drain(&mut sub)
        .into_iter()
        .filter_map(|event| match event {
            GameEvent::CardConcealed { slot, .. } => Some(slot),
            _ => None,
        })
        .collect();
    assert_eq!(concealed, vec![a, b]);

    let (_, state) = call(&routes, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(state["state"]["phase"], "awaiting_first_card");
}

#[tokio::test]
async fn delete_announces_game_ended() {
    let (ctx, routes) = routes();
    let id = create(&routes, 4).await;
    let mut sub = ctx.event_bus().subscribe(id.clone());

    call(&routes, "DELETE", &format!("/api/sessions/{id}"), None).await;
    match sub.receiver().try_recv() {
        Ok(GameEvent::GameEnded { reason, .. }) => assert_eq!(reason, "terminated_by_request"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn event_stream_requires_live_session() {
    let (_ctx, routes) = routes();
    let (status, body) = call(&routes, "GET", "/api/sessions/ghost/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
}

#[tokio::test]
async fn live_server_serves_sse_headers_and_shuts_down() {
    let handle = WebServer::new(ServerConfig::for_tests())
        .expect("construct server")
        .start()
        .await
        .expect("start server");
    let address = handle.address();
    assert_ne!(address.port(), 0);

    let id = handle
        .context()
        .sessions()
        .create_session(Default::default())
        .expect("create session");

    let mut stream = tokio::net::TcpStream::connect(address).await.expect("connect");
    let request = format!(
        "GET /api/sessions/{id}/events HTTP/1.1\r\nHost: {address}\r\nAccept: text/event-stream\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut buf = vec![0u8; 1024];
    let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("headers arrive")
        .unwrap();
    let head = String::from_utf8_lossy(&buf[..n]).to_lowercase();
    assert!(head.starts_with("http/1.1 200"), "{head}");
    assert!(head.contains("content-type: text/event-stream"));
    assert!(head.contains("cache-control: no-cache"));

    drop(stream);
    handle.shutdown().await.expect("clean shutdown");
}
