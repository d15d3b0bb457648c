//! Shared fixtures for Haven integration tests.
//!
//! The [`CapturingRouter`] stands in for the overlay routing layer: outbound
//! envelopes are recorded instead of transmitted, and tests synthesize group
//! replies by calling the facade's `handle_message` hook directly.

use std::sync::Mutex;
use std::time::Duration;

use haven_client::router::Router;
use haven_types::Receiver;
use haven_wire::envelope::{CacheHint, Envelope};
use haven_wire::persona::{MessageAction, Persona, WireTable};

/// One captured outbound message.
#[derive(Clone, Debug)]
pub struct SentMessage {
    /// Destination binding the dispatcher chose.
    pub receiver: Receiver,
    /// The encoded envelope.
    pub bytes: Vec<u8>,
    /// The caching hint attached to the envelope.
    pub cache_hint: CacheHint,
}

/// A router that records outbound traffic instead of delivering it.
#[derive(Default)]
pub struct CapturingRouter {
    sent: Mutex<Vec<SentMessage>>,
}

impl CapturingRouter {
    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("router lock").clone()
    }
}

impl Router for CapturingRouter {
    fn send(&self, receiver: Receiver, message: Vec<u8>, cache_hint: CacheHint) {
        self.sent.lock().expect("router lock").push(SentMessage {
            receiver,
            bytes: message,
            cache_hint,
        });
    }
}

/// Wait until the router has captured at least `count` messages.
///
/// Panics after ~1s of (virtual) time so a missing dispatch fails the test
/// rather than hanging it.
pub async fn wait_for_sends(router: &CapturingRouter, count: usize) -> Vec<SentMessage> {
    for _ in 0..1000 {
        let sent = router.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("timed out waiting for {count} outbound messages");
}

/// Build an encoded reply envelope as a vault group would.
pub fn reply_envelope(
    table: &WireTable,
    action: MessageAction,
    source: Persona,
    destination: Persona,
    message_id: u32,
    payload: Vec<u8>,
) -> Vec<u8> {
    Envelope {
        action,
        source,
        destination,
        message_id,
        payload,
    }
    .encode(table)
    .expect("encode reply envelope")
}

/// Initialise test logging from `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
