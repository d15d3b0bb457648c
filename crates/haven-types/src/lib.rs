//! # haven-types
//!
//! Shared domain types used across the Haven workspace: overlay identifiers,
//! data names and version records, and the Ed25519 signing identities a
//! client uses to stamp protocol payloads.

pub mod data;
pub mod signing;

/// A 256-bit overlay node identifier.
pub type NodeId = [u8; 32];

/// A node identifier reinterpreted as the address of the closest-G group
/// around it. The routing layer resolves this to the concrete group members.
pub type GroupId = [u8; 32];

/// A 256-bit content address or public-key fingerprint (BLAKE3 output).
pub type Identity = [u8; 32];

/// Correlator carried in every envelope to match replies to an outstanding
/// request. Allocated by the pending-operation registry.
pub type MessageId = u32;

/// Registry key for a pending operation. Identical to the message id carried
/// on the wire; the two names reflect the two sides of the correlation.
pub type TaskId = u32;

/// Destination binding handed to the routing layer alongside an encoded
/// envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// A single overlay node.
    Node(NodeId),
    /// The closest-G group around an address.
    Group(GroupId),
}

/// Render the leading bytes of a 256-bit identifier for log output.
pub fn short_id(id: &[u8; 32]) -> String {
    hex::encode(&id[..4])
}
