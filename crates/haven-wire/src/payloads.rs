//! Request payload records.
//!
//! Each record is a plain value type with a total serialization round-trip
//! through [`WirePayload`]. Invariants (non-empty byte fields, the
//! exactly-one-of rule on [`DataNameAndContentOrCheckResult`]) are enforced
//! both on serialise and on parse, so a malformed record can neither be
//! emitted nor accepted.

use haven_types::data::{DataName, DataVersion};
use haven_types::signing::{verify, SigningIdentity};
use haven_types::Identity;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{WireError, WirePayload};

impl WirePayload for DataName {}

/// Zero-byte marker payload for operations that carry no arguments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty;

impl WirePayload for Empty {
    fn serialise(&self) -> Result<Vec<u8>, WireError> {
        Ok(Vec::new())
    }

    fn parse(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.is_empty() {
            Ok(Empty)
        } else {
            Err(WireError::Parse(format!(
                "expected zero-byte payload, got {} bytes",
                bytes.len()
            )))
        }
    }
}

/// Advertised spare capacity of a storage node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSize {
    /// Capacity in bytes.
    pub size: u64,
}

impl WirePayload for AvailableSize {}

/// A data name plus one version of its history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndVersion {
    /// The record being addressed.
    pub name: DataName,
    /// The version within its history.
    pub version: DataVersion,
}

impl WirePayload for DataNameAndVersion {}

/// A data name plus an old/new version pair for an append.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameOldNewVersion {
    /// The record being appended to.
    pub name: DataName,
    /// The version the append builds on.
    pub old_version: DataVersion,
    /// The version being appended.
    pub new_version: DataVersion,
}

impl WirePayload for DataNameOldNewVersion {}

/// A data name together with the object's content bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndContent {
    /// The object's name.
    pub name: DataName,
    /// The object's content. Never empty.
    pub content: Vec<u8>,
}

impl DataNameAndContent {
    /// Construct, rejecting empty content.
    pub fn new(name: DataName, content: Vec<u8>) -> Result<Self, WireError> {
        let value = Self { name, content };
        value.validate()?;
        Ok(value)
    }
}

impl WirePayload for DataNameAndContent {
    fn validate(&self) -> Result<(), WireError> {
        if self.content.is_empty() {
            return Err(WireError::Parse("empty content".to_string()));
        }
        Ok(())
    }
}

/// A data name together with an opaque random challenge string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndRandomString {
    /// The object's name.
    pub name: DataName,
    /// Challenge bytes. Never empty.
    pub random: Vec<u8>,
}

impl DataNameAndRandomString {
    /// Construct, rejecting an empty challenge.
    pub fn new(name: DataName, random: Vec<u8>) -> Result<Self, WireError> {
        let value = Self { name, random };
        value.validate()?;
        Ok(value)
    }
}

impl WirePayload for DataNameAndRandomString {
    fn validate(&self) -> Result<(), WireError> {
        if self.random.is_empty() {
            return Err(WireError::Parse("empty random string".to_string()));
        }
        Ok(())
    }
}

/// A data name together with a signed storage cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndCost {
    /// The object's name.
    pub name: DataName,
    /// Cost units; negative values express refunds.
    pub cost: i32,
}

impl WirePayload for DataNameAndCost {}

/// A data name together with a signed size delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndSize {
    /// The object's name.
    pub name: DataName,
    /// Size units; negative values express reclaimed space.
    pub size: i32,
}

impl WirePayload for DataNameAndSize {}

/// A publish request: the object plus a hint naming a preferred storage node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAndPmidHint {
    /// The object being published.
    pub data: DataNameAndContent,
    /// Name of the storage node the publisher would like to hold a replica.
    pub pmid_hint: Identity,
}

impl WirePayload for DataAndPmidHint {
    fn validate(&self) -> Result<(), WireError> {
        self.data.validate()
    }
}

/// A fetch result that carries either the content or an integrity digest.
///
/// Exactly one of `content` / `check_result` is populated; a record with
/// both or neither fails to serialise and fails to parse.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndContentOrCheckResult {
    /// The object's name.
    pub name: DataName,
    /// The object's content, when the full object was requested.
    pub content: Option<Vec<u8>>,
    /// A 64-byte integrity digest, when only a check was requested.
    #[serde_as(as = "Option<serde_with::Bytes>")]
    pub check_result: Option<[u8; 64]>,
}

impl DataNameAndContentOrCheckResult {
    /// Construct the content-bearing form.
    pub fn with_content(name: DataName, content: Vec<u8>) -> Result<Self, WireError> {
        let value = Self {
            name,
            content: Some(content),
            check_result: None,
        };
        value.validate()?;
        Ok(value)
    }

    /// Construct the digest-bearing form.
    pub fn with_check_result(name: DataName, check_result: [u8; 64]) -> Self {
        Self {
            name,
            content: None,
            check_result: Some(check_result),
        }
    }
}

impl WirePayload for DataNameAndContentOrCheckResult {
    fn validate(&self) -> Result<(), WireError> {
        let has_content = self.content.is_some();
        let has_check = self.check_result.is_some();
        if has_content == has_check {
            return Err(WireError::Parse(
                "exactly one of content and check_result must be populated".to_string(),
            ));
        }
        if self.content.as_ref().is_some_and(Vec::is_empty) {
            return Err(WireError::Parse("empty content".to_string()));
        }
        Ok(())
    }
}

/// A storage node's serialised health record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmidHealth {
    /// Opaque health report produced by the pmid managers.
    pub serialised: Vec<u8>,
}

impl WirePayload for PmidHealth {}

/// A signed storage-offer registration binding a pmid to a maid account.
///
/// The pmid signs the binding, then the maid countersigns binding plus pmid
/// signature, so neither identity can be enrolled unilaterally.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmidRegistration {
    /// Name of the account the offer is registered under.
    pub maid_name: Identity,
    /// Name of the storage node being offered.
    pub pmid_name: Identity,
    /// True for a withdrawal of a prior registration.
    pub unregister: bool,
    /// Maid countersignature over the binding and the pmid signature.
    #[serde_as(as = "serde_with::Bytes")]
    pub maid_signature: [u8; 64],
    /// Pmid signature over the binding.
    #[serde_as(as = "serde_with::Bytes")]
    pub pmid_signature: [u8; 64],
}

impl PmidRegistration {
    /// Build and sign a registration with both identities.
    pub fn new(maid: &SigningIdentity, pmid: &SigningIdentity, unregister: bool) -> Self {
        let maid_name = maid.name();
        let pmid_name = pmid.name();
        let binding = Self::binding(&maid_name, &pmid_name, unregister);
        let pmid_signature = pmid.sign(&binding);
        let mut countersigned = binding;
        countersigned.extend_from_slice(&pmid_signature);
        let maid_signature = maid.sign(&countersigned);
        Self {
            maid_name,
            pmid_name,
            unregister,
            maid_signature,
            pmid_signature,
        }
    }

    /// Verify both signatures against the raw verifying keys.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidSignature`] naming the failing signature.
    pub fn verify_signatures(
        &self,
        maid_public_key: &[u8; 32],
        pmid_public_key: &[u8; 32],
    ) -> Result<(), WireError> {
        let binding = Self::binding(&self.maid_name, &self.pmid_name, self.unregister);
        if !verify(pmid_public_key, &binding, &self.pmid_signature) {
            return Err(WireError::InvalidSignature("pmid registration (pmid)"));
        }
        let mut countersigned = binding;
        countersigned.extend_from_slice(&self.pmid_signature);
        if !verify(maid_public_key, &countersigned, &self.maid_signature) {
            return Err(WireError::InvalidSignature("pmid registration (maid)"));
        }
        Ok(())
    }

    fn binding(maid_name: &Identity, pmid_name: &Identity, unregister: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(maid_name);
        bytes.extend_from_slice(pmid_name);
        bytes.push(u8::from(unregister));
        bytes
    }
}

impl WirePayload for PmidRegistration {}
