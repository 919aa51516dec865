//! openHAB item event client

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::streaming::{EventStream, StreamResult};
use crate::topic::{ItemEventKind, Topic};

/// Path of the hub's SSE endpoint, relative to the base URL
pub const EVENTS_PATH: &str = "/rest/events";

/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Subscribes to item events on an openHAB hub
///
/// Every method opens a new connection and returns a fresh [`EventStream`].
/// Errors from the transport are returned as-is; nothing is retried.
#[derive(Debug, Clone)]
pub struct ItemEventClient {
    client: Client,
    config: ConnectionConfig,
}

impl ItemEventClient {
    /// Create a new event client
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        Self::with_connect_timeout(config, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new event client with a custom connection timeout
    ///
    /// No total request timeout is set since event streams stay open
    /// indefinitely.
    pub fn with_connect_timeout(
        config: ConnectionConfig,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;

        Ok(Self {
            client,
            config: config.normalized(),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// URL a subscription to `topic` requests
    ///
    /// Built by plain concatenation: `<base_url>/rest/events?topics=<topic>`.
    pub fn events_url(&self, topic: &Topic) -> StreamResult<Url> {
        let url = format!("{}{}?topics={}", self.config.base_url(), EVENTS_PATH, topic);
        Ok(Url::parse(&url)?)
    }

    // =========================================================================
    // Item Events
    // =========================================================================

    /// Subscribe to every item event
    pub async fn all_events(&self) -> StreamResult<EventStream> {
        self.subscribe(&Topic::AllItems).await
    }

    /// Subscribe to `openhab/items/<item>/added`
    pub async fn item_added(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::Added)).await
    }

    /// Subscribe to `openhab/items/<item>/removed`
    pub async fn item_removed(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::Removed)).await
    }

    /// Subscribe to `openhab/items/<item>/updated`
    pub async fn item_updated(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::Updated)).await
    }

    /// Subscribe to `openhab/items/<item>/command`
    pub async fn item_command(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::Command)).await
    }

    /// Subscribe to `openhab/items/<item>/state`
    pub async fn item_state(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::State)).await
    }

    /// Subscribe to `openhab/items/<item>/statepredicted`
    pub async fn item_state_predicted(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::StatePredicted))
            .await
    }

    /// Subscribe to `openhab/items/<item>/statechanged`
    pub async fn item_state_changed(&self, item: &str) -> StreamResult<EventStream> {
        self.subscribe(&Topic::item(item, ItemEventKind::StateChanged))
            .await
    }

    /// Subscribe to `openhab/items/<group>/<member>/statechanged`
    pub async fn group_item_state_changed(
        &self,
        group: &str,
        member: &str,
    ) -> StreamResult<EventStream> {
        self.subscribe(&Topic::group_member_state_changed(group, member))
            .await
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Shared call behind every public subscription method
    ///
    /// Sends basic auth only when both username and password are configured.
    #[instrument(skip(self, topic), fields(topic = %topic))]
    async fn subscribe(&self, topic: &Topic) -> StreamResult<EventStream> {
        let url = self.events_url(topic)?;

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/event-stream");
        match self.config.credentials() {
            Some((username, password)) => {
                debug!(username, "Using basic authentication");
                request = request.basic_auth(username, Some(password));
            }
            None => debug!("Connecting without authentication"),
        }

        EventStream::connect(request, topic.clone(), url).await
    }
}
