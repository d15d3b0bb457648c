//! The routing-layer seam.

use haven_types::Receiver;
use haven_wire::envelope::CacheHint;

/// Handle to the external overlay routing layer.
///
/// `send` is fire-and-forget: delivery is best-effort-with-redundancy and
/// replies come back through the facade's `handle_message` hook, which the
/// embedding application installs as the routing layer's delivery callback.
pub trait Router: Send + Sync {
    /// Submit an encoded envelope for delivery.
    fn send(&self, receiver: Receiver, message: Vec<u8>, cache_hint: CacheHint);
}
