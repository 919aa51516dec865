//! Streaming support for openHAB item events
//!
//! Provides SSE (Server-Sent Events) streaming from `/rest/events`.
//!
//! # Example
//!
//! ```no_run
//! use openhab_events::{ConnectionConfig, ItemEventClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ItemEventClient::new(ConnectionConfig::new("http://openhab.local:8080"))?;
//!
//! let mut events = client.all_events().await?;
//!
//! while let Some(event) = events.next().await {
//!     match event {
//!         Ok(event) => match event.json() {
//!             Ok(json) => println!("{}", json),
//!             Err(_) => eprintln!("Event could not be converted to JSON"),
//!         },
//!         Err(e) => {
//!             eprintln!("Stream error: {}", e);
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod subscription;
mod types;

pub use subscription::EventStream;
pub use types::{EventEnvelope, ItemEvent, StreamError, StreamResult};
