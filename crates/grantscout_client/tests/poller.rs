use std::sync::{Arc, Mutex};
use std::time::Duration;

use grantscout_client::{
    poll_job, ApiError, ClientEvent, ClientSettings, EventSink, Flow, GrantsApi, JobProgress,
    JobState, ReqwestGrantsApi,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct TestSink {
    events: Arc<Mutex<Vec<ClientEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: ClientEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn api_for(server: &MockServer) -> Arc<dyn GrantsApi> {
    let base = Url::parse(&format!("{}/harvest", server.uri())).unwrap();
    let mut settings = ClientSettings::new(base);
    settings.poll_interval = Duration::from_millis(20);
    Arc::new(ReqwestGrantsApi::new(settings).expect("client"))
}

#[tokio::test]
async fn polls_through_active_to_completed_then_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-1",
            "state": "active",
            "progress": { "phase": "SEED_CRAWL", "percent": 20 },
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-1",
            "state": "completed",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::new();
    poll_job(
        api_for(&server),
        Flow::Discovery,
        "job-1".to_string(),
        Duration::from_millis(20),
        CancellationToken::new(),
        sink.clone(),
    )
    .await;

    // The loop has returned; give it a few more cadences to prove no
    // further fetch is issued for the terminal job.
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(
        sink.take(),
        vec![
            ClientEvent::StatusUpdate {
                flow: Flow::Discovery,
                job_id: "job-1".to_string(),
                state: JobState::Active {
                    progress: Some(JobProgress {
                        phase: "SEED_CRAWL".to_string(),
                        percent: 20,
                        current_url: None,
                    }),
                },
            },
            ClientEvent::StatusUpdate {
                flow: Flow::Discovery,
                job_id: "job-1".to_string(),
                state: JobState::Completed,
            },
        ]
    );
    // Mock expectations (one request each) are verified when `server` drops.
}

#[tokio::test]
async fn stops_after_backend_reported_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-2",
            "state": "failed",
            "failedReason": "timeout contacting source",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::new();
    poll_job(
        api_for(&server),
        Flow::Harvest,
        "job-2".to_string(),
        Duration::from_millis(20),
        CancellationToken::new(),
        sink.clone(),
    )
    .await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(
        sink.take(),
        vec![ClientEvent::StatusUpdate {
            flow: Flow::Harvest,
            job_id: "job-2".to_string(),
            state: JobState::Failed {
                reason: Some("timeout contacting source".to_string()),
            },
        }]
    );
}

#[tokio::test]
async fn fetch_error_emits_poll_failed_and_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-3/status"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::new();
    poll_job(
        api_for(&server),
        Flow::Discovery,
        "job-3".to_string(),
        Duration::from_millis(20),
        CancellationToken::new(),
        sink.clone(),
    )
    .await;

    assert_eq!(
        sink.take(),
        vec![ClientEvent::PollFailed {
            flow: Flow::Discovery,
            job_id: "job-3".to_string(),
            error: ApiError::Status(500),
        }]
    );
}

#[tokio::test]
async fn cancellation_stops_an_active_watcher() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-4/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-4",
            "state": "active",
        })))
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(poll_job(
        api_for(&server),
        Flow::Discovery,
        "job-4".to_string(),
        Duration::from_millis(20),
        cancel.clone(),
        sink.clone(),
    ));

    // Let at least one fetch happen, then tear the watcher down.
    tokio::time::sleep(Duration::from_millis(70)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_millis(500), task)
        .await
        .expect("watcher exits on cancellation")
        .expect("watcher task");

    let events = sink.take();
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| matches!(
        event,
        ClientEvent::StatusUpdate {
            state: JobState::Active { .. },
            ..
        }
    )));
}

#[tokio::test]
async fn cancellation_before_first_cadence_issues_no_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/harvest/jobs/job-5/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "job-5",
            "state": "active",
        })))
        .expect(0)
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    poll_job(
        api_for(&server),
        Flow::Discovery,
        "job-5".to_string(),
        Duration::from_millis(20),
        cancel,
        sink.clone(),
    )
    .await;

    assert!(sink.take().is_empty());
}
