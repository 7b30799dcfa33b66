use serde_json::Value;

use crate::integration::init_tracing;
use crate::utils::TestServer;

#[tokio::test]
async fn test_health_reports_ok() -> anyhow::Result<()> {
    init_tracing();
    let server = TestServer::spawn().await?;

    let response = reqwest::get(format!("{}/api/health", server.url())).await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["ok"], true);
    assert!(body["uptime"].is_u64());
    Ok(())
}

#[tokio::test]
async fn test_sessions_requires_credential() -> anyhow::Result<()> {
    init_tracing();
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/sessions", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");

    let response = client
        .get(format!("{}/api/sessions?token=not.a.jwt", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), 401);

    let (_ws, id) = server.connect("alice").await?;

    let response = client
        .get(format!("{}/api/sessions", server.url()))
        .bearer_auth(server.token_for("admin"))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    let sessions = body.as_array().expect("array of sessions");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["connectionId"], id);
    assert_eq!(sessions[0]["email"], "alice@example.com");
    Ok(())
}

#[tokio::test]
async fn test_webrtc_config_without_turn() -> anyhow::Result<()> {
    init_tracing();
    let server = TestServer::spawn().await?;

    let body: Value = reqwest::get(format!("{}/api/webrtc-config", server.url()))
        .await?
        .json()
        .await?;

    assert_eq!(body["iceServers"], Value::Array(vec![]));
    assert_eq!(body["iceTransportPolicy"], "all");
    Ok(())
}

#[tokio::test]
async fn test_webrtc_config_with_turn() -> anyhow::Result<()> {
    init_tracing();
    let server = TestServer::spawn_with(&[
        ("TURN_URLS", "turns:turn.example.com:5349"),
        ("TURN_USERNAME", "user"),
        ("TURN_CREDENTIAL", "secret"),
    ])
    .await?;

    let body: Value = reqwest::get(format!("{}/api/webrtc-config", server.url()))
        .await?
        .json()
        .await?;

    assert_eq!(body["iceServers"][0]["urls"][0], "turns:turn.example.com:5349");
    assert_eq!(body["iceServers"][0]["username"], "user");
    assert_eq!(body["iceTransportPolicy"], "relay");
    Ok(())
}
