//! Live event stream

use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures::stream::{Stream, StreamExt};
use reqwest::RequestBuilder;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource};
use tracing::{debug, trace};
use url::Url;

use super::types::{ItemEvent, StreamError, StreamResult};
use crate::topic::Topic;

/// An open connection to the hub's event endpoint
///
/// Implements `Stream<Item = Result<ItemEvent, StreamError>>`. The stream
/// ends when the server closes the connection; dropping it closes the
/// connection from our side. There is no reconnection.
///
/// # Example
///
/// ```ignore
/// let mut events = client.item_state_changed("Lamp").await?;
///
/// while let Some(event) = events.next().await {
///     println!("{}", event?.data);
/// }
/// ```
pub struct EventStream {
    topic: Topic,
    url: Url,
    source: EventSource,
    /// Message that arrived before the open notification was seen
    pending: Option<ItemEvent>,
}

impl EventStream {
    /// Send the prepared request and wait until the hub accepts the stream
    pub(crate) async fn connect(
        request: RequestBuilder,
        topic: Topic,
        url: Url,
    ) -> StreamResult<Self> {
        debug!("Connecting to SSE stream: {}", url);

        let mut source = EventSource::new(request)?;
        source.set_retry_policy(Box::new(Never));

        let pending = match source.next().await {
            Some(Ok(Event::Open)) => None,
            Some(Ok(Event::Message(message))) => Some(ItemEvent::from_message(
                message.data,
                message.event,
                message.id,
            )),
            Some(Err(reqwest_eventsource::Error::InvalidStatusCode(status, response))) => {
                source.close();
                let message = response.text().await.unwrap_or_default();
                return Err(StreamError::Server {
                    status: status.as_u16(),
                    message,
                });
            }
            Some(Err(e)) => {
                source.close();
                return Err(StreamError::from(e));
            }
            None => return Err(StreamError::Closed),
        };

        Ok(Self {
            topic,
            url,
            source,
            pending,
        })
    }

    /// Topic this stream is subscribed to
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Full URL that was requested
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the next event from the stream
    ///
    /// Returns `None` when the server closes the connection.
    pub async fn next(&mut self) -> Option<StreamResult<ItemEvent>> {
        <Self as StreamExt>::next(self).await
    }
}

impl Stream for EventStream {
    type Item = StreamResult<ItemEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if let Some(event) = this.pending.take() {
            return Poll::Ready(Some(Ok(event)));
        }

        loop {
            match ready!(this.source.poll_next_unpin(cx)) {
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(message))) => {
                    trace!(event = %message.event, "Received event");
                    return Poll::Ready(Some(Ok(ItemEvent::from_message(
                        message.data,
                        message.event,
                        message.id,
                    ))));
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                    debug!(topic = %this.topic, "SSE stream ended");
                    this.source.close();
                    return Poll::Ready(None);
                }
                Some(Err(e)) => return Poll::Ready(Some(Err(StreamError::from(e)))),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("topic", &self.topic)
            .field("url", &self.url.as_str())
            .finish()
    }
}
