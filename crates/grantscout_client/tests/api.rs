use grantscout_client::{
    ApiError, ClientSettings, CreateSourceRequest, GrantsApi, JobState, ReqwestGrantsApi,
};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestGrantsApi {
    let base = Url::parse(&format!("{}/harvest", server.uri())).unwrap();
    ReqwestGrantsApi::new(ClientSettings::new(base)).expect("client")
}

#[tokio::test]
async fn discover_posts_links_and_depth_and_returns_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/harvest/funders/funder-1/discover-sources"))
        .and(body_json(serde_json::json!({
            "manualLinks": ["https://example.org/grants"],
            "searchDepth": 2,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jobId": "job-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let job_id = api
        .discover_sources(
            "funder-1",
            &["https://example.org/grants".to_string()],
            2,
        )
        .await
        .expect("trigger ok");

    assert_eq!(job_id, "job-1");
}

#[tokio::test]
async fn discover_surfaces_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/harvest/funders/funder-1/discover-sources"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .discover_sources("funder-1", &[], 1)
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Status(500));
}

#[tokio::test]
async fn harvest_trigger_returns_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/harvest/sources/source-9/trigger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jobId": "job-7",
            "message": "Harvest enqueued",
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(api.trigger_harvest("source-9").await.unwrap(), "job-7");
}

#[tokio::test]
async fn status_decodes_active_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-1",
            "state": "active",
            "progress": {
                "phase": "SEED_CRAWL",
                "percent": 20,
                "currentUrl": "https://example.org/grants",
            },
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let snapshot = api.job_status("job-1").await.expect("status ok");

    assert_eq!(snapshot.id, "job-1");
    match snapshot.state {
        JobState::Active {
            progress: Some(progress),
        } => {
            assert_eq!(progress.phase, "SEED_CRAWL");
            assert_eq!(progress.percent, 20);
            assert_eq!(
                progress.current_url.as_deref(),
                Some("https://example.org/grants")
            );
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn status_decodes_terminal_states() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-2",
            "state": "completed",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-3/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-3",
            "state": "failed",
            "failedReason": "timeout contacting source",
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);

    let completed = api.job_status("job-2").await.unwrap();
    assert_eq!(completed.state, JobState::Completed);
    assert!(completed.state.is_terminal());

    let failed = api.job_status("job-3").await.unwrap();
    assert_eq!(
        failed.state,
        JobState::Failed {
            reason: Some("timeout contacting source".to_string()),
        }
    );
}

#[tokio::test]
async fn status_rejects_states_outside_the_closed_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-4/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-4",
            "state": "delayed",
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.job_status("job-4").await.unwrap_err();

    assert_eq!(err, ApiError::UnknownState("delayed".to_string()));
}

#[tokio::test]
async fn suggested_sources_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/funders/funder-1/suggested-sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sources": [{
                "url": "https://example.org/grants",
                "anchorText": "Grants",
                "score": 0.92,
                "keywords": ["grant", "funding"],
            }],
            "lastDiscoveryAt": "2025-11-02T10:00:00Z",
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let page = api.suggested_sources("funder-1").await.expect("page ok");

    assert_eq!(page.sources.len(), 1);
    assert_eq!(page.sources[0].anchor_text.as_deref(), Some("Grants"));
    assert_eq!(page.sources[0].keywords, ["grant", "funding"]);
    assert_eq!(
        page.last_discovery_at.as_deref(),
        Some("2025-11-02T10:00:00Z")
    );
}

#[tokio::test]
async fn configured_sources_unwraps_envelope_and_passes_funder_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/sources"))
        .and(query_param("funderId", "funder-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{
                "id": "source-9",
                "name": "Open calls",
                "baseUrl": "https://example.org/grants",
                "enabled": true,
                "funderId": "funder-1",
            }],
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let sources = api.configured_sources("funder-1").await.expect("sources ok");

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, "source-9");
    assert!(sources[0].enabled);
}

#[tokio::test]
async fn create_source_posts_camel_case_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/harvest/sources"))
        .and(body_json(serde_json::json!({
            "name": "Open calls",
            "baseUrl": "https://example.org/grants",
            "funderId": "funder-1",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "source-10",
            "name": "Open calls",
            "baseUrl": "https://example.org/grants",
            "enabled": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let created = api
        .create_source(&CreateSourceRequest {
            name: "Open calls".to_string(),
            base_url: "https://example.org/grants".to_string(),
            funder_id: "funder-1".to_string(),
        })
        .await
        .expect("created");

    assert_eq!(created.id, "source-10");
}
