use dashboard_client::config::ClientConfig;
use dashboard_client::http_client::ReqwestUpstreamClient;
use dashboard_client::{DashboardError, Source, UpstreamClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestUpstreamClient {
    let cfg = ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    };
    ReqwestUpstreamClient::new(&cfg).expect("client")
}

#[tokio::test]
async fn fetch_projects_returns_raw_json() {
    let server = MockServer::start().await;
    let body = serde_json::json!({"projects": [{"project_id": "p1", "status": "Active"}]});
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = client.fetch_source(Source::Projects).await.expect("projects");
    assert_eq!(value, body);
}

#[tokio::test]
async fn every_source_hits_its_own_path() {
    let server = MockServer::start().await;
    for source in Source::ALL {
        Mock::given(method("GET"))
            .and(path(source.path()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"source": source.as_str()})),
            )
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    for source in Source::ALL {
        let value = client.fetch_source(source).await.expect("fetch");
        assert_eq!(
            value.get("source").and_then(|v| v.as_str()),
            Some(source.as_str())
        );
    }
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), Source::ALL.len());
}

#[tokio::test]
async fn not_found_maps_to_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stories/highlights"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no stories"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_source(Source::Stories).await.unwrap_err();
    assert!(matches!(err, DashboardError::NotFound(ref body) if body == "no stories"));
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gmail/status"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_source(Source::Mailbox).await.unwrap_err();
    assert_eq!(err.kind(), "auth");
}

#[tokio::test]
async fn server_error_keeps_status_and_truncated_body() {
    let server = MockServer::start().await;
    let long_body = "x".repeat(1000);
    Mock::given(method("GET"))
        .and(path("/api/financial/summary"))
        .respond_with(ResponseTemplate::new(503).set_body_string(long_body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.fetch_source(Source::FinancialSummary).await {
        Err(DashboardError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body.len(), 256);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/outreach/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_source(Source::OutreachTasks).await.unwrap_err();
    assert!(matches!(err, DashboardError::Http(_)));
}

#[tokio::test]
async fn application_error_envelope_is_passed_through() {
    // Envelope interpretation belongs to the engine; the client returns the body as-is.
    let server = MockServer::start().await;
    let body = serde_json::json!({"error": "Notion API rate limited"});
    Mock::given(method("GET"))
        .and(path("/api/integrations/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = client.fetch_source(Source::Integrations).await.expect("body");
    assert_eq!(value, body);
}
