//! # haven-wire
//!
//! Wire protocol for the Haven network-filesystem client:
//!
//! - **Message envelope** carrying action, source/destination personas, a
//!   32-bit message id, and an opaque CBOR payload via [`envelope`]
//! - **Persona and action registry** with the injectable code table via
//!   [`persona`]
//! - **Payload records** for every request family via [`payloads`]
//! - **Reply unions** (value-or-return-code) via [`replies`]
//! - **CBOR serialization** helpers via [`cbor`]
//!
//! The crate is transport-agnostic: encoded envelopes are handed to an
//! external routing layer as plain byte strings.

pub mod cbor;
pub mod envelope;
pub mod payloads;
pub mod persona;
pub mod replies;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error types for wire encoding and parsing.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A value could not be CBOR-serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Inbound bytes are not a valid envelope or payload, or violate a
    /// record invariant.
    #[error("parse error: {0}")]
    Parse(String),

    /// A signature on a signed payload did not verify.
    #[error("invalid signature on {0}")]
    InvalidSignature(&'static str),

    /// An injected wire-code table assigns the same byte twice.
    #[error("invalid wire table: {0}")]
    InvalidTable(String),
}

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Total serialization for a wire record.
///
/// `parse(serialise(p)) == p` for every value that passes [`validate`];
/// parsing re-runs validation so malformed or invariant-violating bytes are
/// rejected with [`WireError::Parse`].
///
/// [`validate`]: WirePayload::validate
pub trait WirePayload: Serialize + DeserializeOwned + Sized {
    /// Check record invariants. The default is unconditionally valid.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Serialize to CBOR bytes, refusing invariant-violating values.
    fn serialise(&self) -> Result<Vec<u8>> {
        self.validate()?;
        cbor::to_vec(self)
    }

    /// Reconstruct from CBOR bytes, enforcing record invariants.
    fn parse(bytes: &[u8]) -> Result<Self> {
        let value: Self = cbor::from_slice(bytes)?;
        value.validate()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WireError::Parse("bad header".to_string());
        assert_eq!(err.to_string(), "parse error: bad header");

        let err = WireError::InvalidSignature("pmid registration");
        assert!(err.to_string().contains("pmid registration"));
    }
}
