#![allow(dead_code)]

use pairs_engine::cards::is_pair;
use pairs_engine::deck::Deck;
use pairs_web::server::{AppContext, WebServer};
use serde_json::Value;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;

pub fn routes() -> (AppContext, BoxedFilter<(Response,)>) {
    let context = AppContext::new_for_tests();
    let routes = WebServer::routes(&context);
    (context, routes)
}

pub async fn call(
    routes: &BoxedFilter<(Response,)>,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = warp::test::request().method(method).path(path);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.reply(routes).await;
    let status = response.status();
    let json = if response.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(response.body()).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn create(routes: &BoxedFilter<(Response,)>, seed: u64) -> String {
    let (status, body) = call(
        routes,
        "POST",
        "/api/sessions",
        Some(serde_json::json!({ "seed": seed })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["session_id"].as_str().expect("session id").to_string()
}

/// First slot pair on the table dealt from `seed` that matches, and one that does not.
pub fn known_slots(seed: u64) -> ((usize, usize), (usize, usize)) {
    let deck = Deck::new_with_seed(seed);
    let first = deck.card_at(0).unwrap();
    let matching = (1..deck.len())
        .find(|&s| is_pair(first, deck.card_at(s).unwrap()))
        .unwrap();
    let other = (1..deck.len())
        .find(|&s| !is_pair(first, deck.card_at(s).unwrap()))
        .unwrap();
    ((0, matching), (0, other))
}
