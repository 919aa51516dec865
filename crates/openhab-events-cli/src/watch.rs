//! Watch command - print events as they arrive

use anyhow::Result;
use futures::{Stream, StreamExt};
use openhab_events::{ItemEvent, StreamError, StreamResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::output::{OutputContext, Rendered};

pub const MALFORMED_EVENT: &str = "Event could not be converted to JSON";

/// What happened to one item pulled from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Printed,
    /// Reported as malformed; iteration continues
    Malformed,
    /// Connection-level failure; iteration stops
    Stop,
}

/// Counts of what a watch loop processed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub printed: usize,
    pub malformed: usize,
}

/// Handle a single stream item
///
/// Undecodable payloads (not JSON, or rejected by the SSE decoder) are
/// reported and skipped. Connection and server errors stop the loop.
pub fn handle_item(item: StreamResult<ItemEvent>, ctx: &OutputContext) -> Step {
    match item {
        Ok(event) => match ctx.render(&event) {
            Rendered::Json(text) => {
                println!("{}", text);
                Step::Printed
            }
            Rendered::Malformed => {
                ctx.warn(MALFORMED_EVENT);
                Step::Malformed
            }
        },
        Err(StreamError::Parse(e)) => {
            debug!(error = %e, "Undecodable event");
            ctx.warn(MALFORMED_EVENT);
            Step::Malformed
        }
        Err(StreamError::Json(e)) => {
            debug!(error = %e, "Non-JSON event");
            ctx.warn(MALFORMED_EVENT);
            Step::Malformed
        }
        Err(e) => {
            ctx.error(&format!("Stream error: {}", e));
            Step::Stop
        }
    }
}

/// Print every event from `stream` until it ends, fails, or `running` clears
pub async fn watch<S>(
    mut stream: S,
    ctx: &OutputContext,
    running: Arc<AtomicBool>,
) -> Result<WatchSummary>
where
    S: Stream<Item = StreamResult<ItemEvent>> + Unpin,
{
    let mut summary = WatchSummary::default();

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            item = stream.next() => {
                let Some(item) = item else {
                    ctx.info("Stream ended");
                    break;
                };
                match handle_item(item, ctx) {
                    Step::Printed => summary.printed += 1,
                    Step::Malformed => summary.malformed += 1,
                    Step::Stop => break,
                }
            }
            _ = tokio::time::sleep(tokio::time::Duration::from_millis(100)) => {
                // Check running flag periodically
            }
        }
    }

    Ok(summary)
}

/// Flag that clears on Ctrl+C
pub fn ctrlc_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}
