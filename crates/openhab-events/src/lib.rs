//! openHAB Item Event Client
//!
//! Subscribes to the server-sent event stream an openHAB hub publishes at
//! `/rest/events`, filtered by item topic.
//!
//! # Example
//!
//! ```rust,no_run
//! use openhab_events::{ConnectionConfig, ItemEventClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectionConfig::new("https://myopenhab.org")
//!         .with_credentials("me@example.com", "secret");
//!     let client = ItemEventClient::new(config)?;
//!
//!     // State changes of a single item
//!     let mut events = client.item_state_changed("Living_Room_Light").await?;
//!
//!     while let Some(event) = events.next().await {
//!         let event = event?;
//!         match event.envelope() {
//!             Ok(envelope) => println!("{:?}: {}", envelope.item_name(), envelope.payload),
//!             Err(_) => println!("Event could not be converted to JSON"),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module runs an axum router as a stand-in hub:
//!
//! ```rust,ignore
//! use openhab_events::testing::TestServer;
//!
//! let server = TestServer::start(router).await?;
//! let mut events = server.client.item_state("Lamp").await?;
//! ```

mod client;
mod config;
mod error;
pub mod streaming;
pub mod testing;
pub mod topic;

pub use client::{ItemEventClient, EVENTS_PATH};
pub use config::{ConnectionConfig, MYOPENHAB_URL};
pub use error::{ItemEventError, Result};
pub use topic::{ItemEventKind, Topic};

// Re-export streaming types for convenience
pub use streaming::{EventEnvelope, EventStream, ItemEvent, StreamError, StreamResult};
