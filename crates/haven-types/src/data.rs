//! Data names and version records.
//!
//! Every object stored on the network is addressed by a [`DataName`]: the
//! family tag plus a 256-bit raw name. Mutable (structured) data additionally
//! carries a linear version history of [`DataVersion`] entries.

use serde::{Deserialize, Serialize};

use crate::Identity;

/// The family of a stored object.
///
/// The variant order is load-bearing: [`DataName`] ordering sorts by
/// `(tag, raw_name)`, so tags compare by declaration order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DataTagValue {
    /// Anonymous maid key (account creation artifact).
    Anmaid,
    /// Maid key (client signing identity).
    Maid,
    /// Anonymous pmid key.
    Anpmid,
    /// Pmid key (storage-node identity).
    Pmid,
    /// Content-addressed immutable blob.
    ImmutableData,
    /// Mutable record with a linear version history.
    MutableData,
}

impl DataTagValue {
    /// Whether this tag names a passport artifact (a published public key).
    pub fn is_passport(self) -> bool {
        matches!(self, Self::Anmaid | Self::Maid | Self::Anpmid | Self::Pmid)
    }
}

/// The fully-qualified name of a stored object.
///
/// Totally ordered by `(tag, raw_name)`; field order is what makes the
/// derived ordering correct.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DataName {
    /// The data family.
    pub tag: DataTagValue,
    /// The 256-bit raw name within the family.
    pub raw_name: Identity,
}

impl DataName {
    /// Construct a data name.
    pub fn new(tag: DataTagValue, raw_name: Identity) -> Self {
        Self { tag, raw_name }
    }
}

/// One entry in a mutable record's version history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataVersion {
    /// Content identity of this version.
    pub id: Identity,
    /// Position in the linear history, starting at zero.
    pub index: u64,
}

impl DataVersion {
    /// Construct a version record.
    pub fn new(id: Identity, index: u64) -> Self {
        Self { id, index }
    }
}
