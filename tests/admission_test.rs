//! Integration tests for the admission surface.

use content_gateway::config::schema::DeploymentMode;

mod common;

/// Idempotent delete of a never-uploaded asset: cheap API request that
/// consumes exactly one admission point per call.
fn probe_path() -> String {
    format!(
        "/api/uploads/blog-images/{}.png",
        uuid::Uuid::new_v4()
    )
}

#[tokio::test]
async fn test_denial_sets_headers_and_body() {
    let gateway = common::spawn_gateway(|config| {
        config.rate_limit.max_points = Some(3);
        config.rate_limit.window_secs = Some(60);
    })
    .await;

    let client = reqwest::Client::new();
    let url = gateway.url(&probe_path());

    for i in 0..3 {
        let res = client.delete(&url).send().await.unwrap();
        assert_eq!(res.status(), 200, "request {} should be admitted", i + 1);
    }

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), 429);

    let headers = res.headers().clone();
    let retry_after: u64 = headers["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(headers["x-ratelimit-limit"], "3");
    assert_eq!(headers["x-ratelimit-remaining"], "0");
    let reset: u64 = headers["x-ratelimit-reset"].to_str().unwrap().parse().unwrap();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    assert!(reset > now && reset <= now + 61);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "too_many_requests");
    assert_eq!(body["retryAfter"], retry_after);
    assert_eq!(body["development"], true);
    assert!(body["message"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn test_routes_outside_api_prefix_are_not_limited() {
    let gateway = common::spawn_gateway(|config| {
        config.rate_limit.max_points = Some(1);
    })
    .await;

    let client = reqwest::Client::new();
    let url = gateway.url(&probe_path());

    assert_eq!(client.delete(&url).send().await.unwrap().status(), 200);
    assert_eq!(client.delete(&url).send().await.unwrap().status(), 429);

    // The health probe lives outside /api and stays reachable.
    for _ in 0..5 {
        let res = client.get(gateway.url("/health")).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }
}

#[tokio::test]
async fn test_bypass_disables_evaluation_in_development() {
    let gateway = common::spawn_gateway(|config| {
        config.rate_limit.max_points = Some(1);
        config.rate_limit.bypass = true;
    })
    .await;

    let client = reqwest::Client::new();
    let url = gateway.url(&probe_path());

    for _ in 0..10 {
        assert_eq!(client.delete(&url).send().await.unwrap().status(), 200);
    }
}

#[tokio::test]
async fn test_bypass_is_not_honored_in_production() {
    let gateway = common::spawn_gateway(|config| {
        config.mode = DeploymentMode::Production;
        config.rate_limit.max_points = Some(1);
        config.rate_limit.bypass = true;
    })
    .await;

    let client = reqwest::Client::new();
    let url = gateway.url(&probe_path());

    assert_eq!(client.delete(&url).send().await.unwrap().status(), 200);

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), 429);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["development"], false);
}

#[tokio::test]
async fn test_allowed_responses_carry_request_id() {
    let gateway = common::spawn_gateway(|_| {}).await;

    let client = reqwest::Client::new();
    let res = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
}
