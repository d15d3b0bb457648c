//! Message envelope for the Haven wire protocol.
//!
//! Every routing message is the CBOR serialization of a [`RawEnvelope`]:
//!
//! ```text
//! RawEnvelope {
//!     action:      u8,       // action code from the wire table
//!     source:      u8,       // source persona code
//!     destination: u8,       // destination persona code
//!     message_id:  u32,      // reply correlator / registry key
//!     payload:     Vec<u8>,  // CBOR-encoded payload record
//! }
//! ```
//!
//! [`Envelope`] is the decoded form with the byte codes resolved through the
//! injected [`WireTable`]. The envelope does not interpret its payload; the
//! message id lives at the envelope level so replies can be correlated before
//! the payload type is known.

use haven_types::MessageId;
use serde::{Deserialize, Serialize};

use crate::cbor;
use crate::persona::{MessageAction, Persona, WireTable};
use crate::WireError;

/// Maximum payload size accepted on parse (allocation-attack guard).
pub const MAX_PAYLOAD_SIZE: usize = 1 << 20;

/// Per-envelope caching advice handed to the routing layer.
///
/// The client never reads the hint back; intermediate nodes may use it to
/// serve or populate caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheHint {
    /// Replies must not be cached.
    None,
    /// Replies to this fetch may be served from intermediate caches.
    GetCacheable,
    /// The stored value may be cached on the write path. Reserved for
    /// vault-side traffic; client dispatch never emits it.
    PutCacheable,
}

impl CacheHint {
    /// The hint for a fetch of the given data family: immutable blobs are
    /// cache-servable, everything else is not.
    pub fn for_get(tag: haven_types::data::DataTagValue) -> Self {
        if tag == haven_types::data::DataTagValue::ImmutableData {
            CacheHint::GetCacheable
        } else {
            CacheHint::None
        }
    }
}

/// On-the-wire envelope shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawEnvelope {
    action: u8,
    source: u8,
    destination: u8,
    message_id: u32,
    payload: Vec<u8>,
}

/// A decoded routing message envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// The semantic action.
    pub action: MessageAction,
    /// Persona the sender is acting as.
    pub source: Persona,
    /// Persona the message is addressed to.
    pub destination: Persona,
    /// Reply correlator; keys the pending-operation registry.
    pub message_id: MessageId,
    /// Opaque CBOR-encoded payload record.
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Encode for transmission using the given wire-code table.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Serialization`] if CBOR encoding fails.
    pub fn encode(&self, table: &WireTable) -> Result<Vec<u8>, WireError> {
        let raw = RawEnvelope {
            action: table.action_code(self.action),
            source: table.persona_code(self.source),
            destination: table.persona_code(self.destination),
            message_id: self.message_id,
            payload: self.payload.clone(),
        };
        cbor::to_vec(&raw)
    }

    /// Decode an inbound envelope using the given wire-code table.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Parse`] if the bytes are not a valid envelope,
    /// if any code byte is unassigned in the table, or if the payload exceeds
    /// [`MAX_PAYLOAD_SIZE`].
    pub fn parse(bytes: &[u8], table: &WireTable) -> Result<Self, WireError> {
        let raw: RawEnvelope = cbor::from_slice(bytes)?;
        if raw.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(WireError::Parse(format!(
                "payload too large: {} bytes, max {MAX_PAYLOAD_SIZE}",
                raw.payload.len()
            )));
        }
        let action = table
            .action(raw.action)
            .ok_or_else(|| WireError::Parse(format!("unassigned action code {:#04x}", raw.action)))?;
        let source = table.persona(raw.source).ok_or_else(|| {
            WireError::Parse(format!("unassigned source persona code {:#04x}", raw.source))
        })?;
        let destination = table.persona(raw.destination).ok_or_else(|| {
            WireError::Parse(format!(
                "unassigned destination persona code {:#04x}",
                raw.destination
            ))
        })?;
        Ok(Self {
            action,
            source,
            destination,
            message_id: raw.message_id,
            payload: raw.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_types::data::DataTagValue;

    fn sample() -> Envelope {
        Envelope {
            action: MessageAction::GetRequest,
            source: Persona::MaidNode,
            destination: Persona::DataManager,
            message_id: 42,
            payload: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        let table = WireTable::default();
        let envelope = sample();
        let bytes = envelope.encode(&table).expect("encode");
        let restored = Envelope::parse(&bytes, &table).expect("parse");
        assert_eq!(restored, envelope);
    }

    #[test]
    fn test_unassigned_action_code_rejected() {
        let table = WireTable::default();
        let raw = RawEnvelope {
            action: 0xEE,
            source: 0x00,
            destination: 0x02,
            message_id: 1,
            payload: vec![],
        };
        let bytes = cbor::to_vec(&raw).expect("encode");
        assert!(Envelope::parse(&bytes, &table).is_err());
    }

    #[test]
    fn test_unassigned_persona_code_rejected() {
        let table = WireTable::default();
        let raw = RawEnvelope {
            action: 0x01,
            source: 0xEE,
            destination: 0x02,
            message_id: 1,
            payload: vec![],
        };
        let bytes = cbor::to_vec(&raw).expect("encode");
        assert!(Envelope::parse(&bytes, &table).is_err());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let table = WireTable::default();
        let raw = RawEnvelope {
            action: 0x01,
            source: 0x00,
            destination: 0x02,
            message_id: 1,
            payload: vec![0u8; MAX_PAYLOAD_SIZE + 1],
        };
        let bytes = cbor::to_vec(&raw).expect("encode");
        assert!(Envelope::parse(&bytes, &table).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let table = WireTable::default();
        assert!(Envelope::parse(&[0xFF, 0x00, 0x13], &table).is_err());
    }

    #[test]
    fn test_message_id_survives_roundtrip() {
        let table = WireTable::default();
        let mut envelope = sample();
        envelope.message_id = u32::MAX;
        let bytes = envelope.encode(&table).expect("encode");
        let restored = Envelope::parse(&bytes, &table).expect("parse");
        assert_eq!(restored.message_id, u32::MAX);
    }

    #[test]
    fn test_cache_hint_for_get() {
        assert_eq!(
            CacheHint::for_get(DataTagValue::ImmutableData),
            CacheHint::GetCacheable
        );
        assert_eq!(CacheHint::for_get(DataTagValue::MutableData), CacheHint::None);
        assert_eq!(CacheHint::for_get(DataTagValue::Pmid), CacheHint::None);
    }
}
