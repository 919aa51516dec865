//! Integration tests for openhab-events
//!
//! These tests run a local axum stand-in for the hub's `/rest/events`
//! endpoint and check what the client actually puts on the wire.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rstest::rstest;

use openhab_events::testing::TestServer;
use openhab_events::{
    ConnectionConfig, EventStream, ItemEventClient, ItemEventKind, StreamError, StreamResult,
};

// =============================================================================
// Stand-in Hub
// =============================================================================

const STATE_CHANGED: &str = r#"{"topic":"openhab/items/Lamp/statechanged","payload":"{\"type\":\"OnOff\",\"value\":\"ON\",\"oldType\":\"OnOff\",\"oldValue\":\"OFF\"}","type":"ItemStateChangedEvent"}"#;
const COMMAND: &str = r#"{"topic":"openhab/items/Lamp/command","payload":"{\"type\":\"OnOff\",\"value\":\"OFF\"}","type":"ItemCommandEvent"}"#;

/// What the hub saw for one request
#[derive(Debug, Clone)]
struct RecordedRequest {
    topics: Option<String>,
    authorization: Option<String>,
    accept: Option<String>,
}

#[derive(Clone, Default)]
struct HubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    payloads: Arc<Vec<String>>,
    /// Required `Authorization` header value, if any
    required_auth: Option<String>,
    /// Verbatim `text/event-stream` body, sent instead of `payloads`
    raw_body: Option<&'static str>,
}

impl HubState {
    fn with_payloads(payloads: &[&str]) -> Self {
        Self {
            payloads: Arc::new(payloads.iter().map(|p| p.to_string()).collect()),
            ..Default::default()
        }
    }

    fn with_raw_body(body: &'static str) -> Self {
        Self {
            raw_body: Some(body),
            ..Default::default()
        }
    }

    fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("hub received no request")
    }
}

async fn events(
    State(state): State<HubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };

    let recorded = RecordedRequest {
        topics: params.get("topics").cloned(),
        authorization: header_str(header::AUTHORIZATION),
        accept: header_str(header::ACCEPT),
    };
    state.requests.lock().push(recorded.clone());

    if let Some(required) = &state.required_auth {
        if recorded.authorization.as_deref() != Some(required.as_str()) {
            return (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
        }
    }

    if let Some(body) = state.raw_body {
        return ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response();
    }

    let events: Vec<Result<Event, Infallible>> = state
        .payloads
        .iter()
        .map(|p| Ok(Event::default().data(p.clone())))
        .collect();

    Sse::new(futures::stream::iter(events)).into_response()
}

fn hub_router(state: HubState) -> Router {
    Router::new()
        .route("/rest/events", get(events))
        .with_state(state)
}

async fn start_hub(state: HubState) -> TestServer {
    TestServer::start(hub_router(state)).await.unwrap()
}

async fn subscribe_kind(
    client: &ItemEventClient,
    kind: ItemEventKind,
    item: &str,
) -> StreamResult<EventStream> {
    match kind {
        ItemEventKind::Added => client.item_added(item).await,
        ItemEventKind::Removed => client.item_removed(item).await,
        ItemEventKind::Updated => client.item_updated(item).await,
        ItemEventKind::Command => client.item_command(item).await,
        ItemEventKind::State => client.item_state(item).await,
        ItemEventKind::StatePredicted => client.item_state_predicted(item).await,
        ItemEventKind::StateChanged => client.item_state_changed(item).await,
    }
}

// =============================================================================
// Topic Tests
// =============================================================================

#[tokio::test]
async fn test_all_events_topic() {
    let state = HubState::default();
    let server = start_hub(state.clone()).await;

    let stream = server.client.all_events().await.unwrap();

    assert_eq!(state.last_request().topics.as_deref(), Some("openhab/items"));
    assert_eq!(stream.topic().to_string(), "openhab/items");
}

#[rstest]
#[case(ItemEventKind::Added, "openhab/items/Kitchen_Light/added")]
#[case(ItemEventKind::Removed, "openhab/items/Kitchen_Light/removed")]
#[case(ItemEventKind::Updated, "openhab/items/Kitchen_Light/updated")]
#[case(ItemEventKind::Command, "openhab/items/Kitchen_Light/command")]
#[case(ItemEventKind::State, "openhab/items/Kitchen_Light/state")]
#[case(ItemEventKind::StatePredicted, "openhab/items/Kitchen_Light/statepredicted")]
#[case(ItemEventKind::StateChanged, "openhab/items/Kitchen_Light/statechanged")]
#[tokio::test]
async fn test_item_topic(#[case] kind: ItemEventKind, #[case] expected: &str) {
    let state = HubState::default();
    let server = start_hub(state.clone()).await;

    let stream = subscribe_kind(&server.client, kind, "Kitchen_Light")
        .await
        .unwrap();

    assert_eq!(state.last_request().topics.as_deref(), Some(expected));
    assert_eq!(stream.url().path(), "/rest/events");
}

#[tokio::test]
async fn test_group_item_state_changed_topic() {
    let state = HubState::default();
    let server = start_hub(state.clone()).await;

    server
        .client
        .group_item_state_changed("gGroundFloor", "Kitchen_Light")
        .await
        .unwrap();

    assert_eq!(
        state.last_request().topics.as_deref(),
        Some("openhab/items/gGroundFloor/Kitchen_Light/statechanged")
    );
}

#[tokio::test]
async fn test_each_call_opens_new_request() {
    let state = HubState::default();
    let server = start_hub(state.clone()).await;

    server.client.item_state("A").await.unwrap();
    server.client.item_state("B").await.unwrap();

    let topics: Vec<_> = state
        .requests
        .lock()
        .iter()
        .map(|r| r.topics.clone().unwrap_or_default())
        .collect();
    assert_eq!(topics, vec!["openhab/items/A/state", "openhab/items/B/state"]);
}

#[tokio::test]
async fn test_requests_event_stream_content_type() {
    let state = HubState::default();
    let server = start_hub(state.clone()).await;

    server.client.all_events().await.unwrap();

    assert_eq!(
        state.last_request().accept.as_deref(),
        Some("text/event-stream")
    );
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_basic_auth_sent_with_both_credentials() {
    let state = HubState::default();
    let server = TestServer::start_with(hub_router(state.clone()), |config| {
        config.with_credentials("user", "pass")
    })
    .await
    .unwrap();

    server.client.all_events().await.unwrap();

    // base64("user:pass")
    assert_eq!(
        state.last_request().authorization.as_deref(),
        Some("Basic dXNlcjpwYXNz")
    );
}

#[rstest]
#[case(Some("user"), None)]
#[case(None, Some("pass"))]
#[case(None, None)]
#[tokio::test]
async fn test_no_auth_without_both_credentials(
    #[case] username: Option<&str>,
    #[case] password: Option<&str>,
) {
    let state = HubState::default();
    let server = TestServer::start_with(hub_router(state.clone()), |config| {
        config.with_optional_credentials(username.map(String::from), password.map(String::from))
    })
    .await
    .unwrap();

    server.client.item_command("Lamp").await.unwrap();

    assert_eq!(state.last_request().authorization, None);
}

#[tokio::test]
async fn test_unauthorized_surfaces_server_error() {
    let state = HubState {
        required_auth: Some("Basic dXNlcjpwYXNz".into()),
        ..Default::default()
    };
    let server = start_hub(state).await;

    let err = server.client.all_events().await.unwrap_err();

    match err {
        StreamError::Server { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Authentication required");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_authorized_request_streams_events() {
    let state = HubState {
        required_auth: Some("Basic dXNlcjpwYXNz".into()),
        ..HubState::with_payloads(&[STATE_CHANGED])
    };
    let server = TestServer::start_with(hub_router(state), |config| {
        config.with_credentials("user", "pass")
    })
    .await
    .unwrap();

    let mut stream = server.client.item_state_changed("Lamp").await.unwrap();

    let event = stream.next().await.unwrap().unwrap();
    assert_eq!(event.data, STATE_CHANGED);
}

// =============================================================================
// Streaming Tests
// =============================================================================

#[tokio::test]
async fn test_events_delivered_in_order_then_stream_ends() {
    let state = HubState::with_payloads(&[STATE_CHANGED, COMMAND]);
    let server = start_hub(state).await;

    let mut stream = server.client.all_events().await.unwrap();

    let first = stream.next().await.unwrap().unwrap();
    let second = stream.next().await.unwrap().unwrap();
    assert!(stream.next().await.is_none());

    let first = first.envelope().unwrap();
    assert_eq!(first.event_type, "ItemStateChangedEvent");
    assert_eq!(first.item_name(), Some("Lamp"));
    assert_eq!(first.payload_json().unwrap()["value"], "ON");

    let second = second.envelope().unwrap();
    assert_eq!(second.event_type, "ItemCommandEvent");
}

#[tokio::test]
async fn test_non_json_payload_does_not_stop_iteration() {
    let state = HubState::with_payloads(&[STATE_CHANGED, "this is not json", COMMAND]);
    let server = start_hub(state).await;

    let mut stream = server.client.all_events().await.unwrap();

    let mut decoded = Vec::new();
    let mut malformed = 0;
    while let Some(event) = stream.next().await {
        match event.unwrap().json() {
            Ok(json) => decoded.push(json),
            Err(StreamError::Json(_)) => malformed += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(malformed, 1);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[1]["type"], "ItemCommandEvent");
}

#[tokio::test]
async fn test_stream_usable_as_futures_stream() {
    use futures::StreamExt;

    let state = HubState::with_payloads(&["a", "b", "c"]);
    let server = start_hub(state).await;

    let stream = server.client.all_events().await.unwrap();
    let data: Vec<String> = stream
        .map(|event| event.unwrap().data)
        .collect()
        .await;

    assert_eq!(data, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_bare_data_line_dispatches_empty_event() {
    let state = HubState::with_raw_body("data: first\n\ndata:\n\ndata: last\n\n");
    let server = start_hub(state).await;

    let mut stream = server.client.all_events().await.unwrap();

    let mut data = Vec::new();
    while let Some(event) = stream.next().await {
        data.push(event.unwrap().data);
    }

    assert_eq!(data, vec!["first", "", "last"]);
}

#[tokio::test]
async fn test_framing_fields_and_multiline_data() {
    let state = HubState::with_raw_body(
        ": keepalive\nevent: alive\nid: 42\ndata: line one\ndata: line two\n\ndata: plain\n\n",
    );
    let server = start_hub(state).await;

    let mut stream = server.client.all_events().await.unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.data, "line one\nline two");
    assert_eq!(first.event_type, "alive");
    assert_eq!(first.id.as_deref(), Some("42"));

    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.data, "plain");
    assert_eq!(second.event_type, "message");

    assert!(stream.next().await.is_none());
}

// =============================================================================
// Failure Tests
// =============================================================================

#[tokio::test]
async fn test_missing_endpoint_surfaces_server_error() {
    let server = TestServer::start(Router::new()).await.unwrap();

    let err = server.client.all_events().await.unwrap_err();

    assert!(matches!(err, StreamError::Server { status: 404, .. }));
}

#[tokio::test]
async fn test_wrong_content_type_rejected() {
    let router = Router::new().route("/rest/events", get(|| async { "plain text" }));
    let server = TestServer::start(router).await.unwrap();

    let err = server.client.all_events().await.unwrap_err();

    assert!(matches!(err, StreamError::InvalidContentType(_)));
}

#[tokio::test]
async fn test_connection_refused_surfaces_connection_error() {
    // Grab a free port, then release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ItemEventClient::new(ConnectionConfig::new(format!("http://{}", addr))).unwrap();

    let err = client.all_events().await.unwrap_err();

    assert!(matches!(err, StreamError::Connection(_)));
}

#[tokio::test]
async fn test_malformed_base_url_surfaces_url_error() {
    let client = ItemEventClient::new(ConnectionConfig::new("not a url")).unwrap();

    let err = client.item_state("Lamp").await.unwrap_err();

    assert!(matches!(err, StreamError::InvalidUrl(_)));
}
