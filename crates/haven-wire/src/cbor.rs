//! CBOR serialization helpers for the Haven wire protocol.
//!
//! Thin wrappers over [`ciborium`] mapping codec failures into [`WireError`].
//! Every payload record and the envelope itself are CBOR-encoded (RFC 8949).

use serde::{de::DeserializeOwned, Serialize};

use crate::WireError;

/// Serialize a value to CBOR bytes.
///
/// # Errors
///
/// Returns [`WireError::Serialization`] if the value cannot be serialized.
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| WireError::Serialization(format!("CBOR serialization failed: {e}")))?;
    Ok(buf)
}

/// Deserialize a value from CBOR bytes.
///
/// # Errors
///
/// Returns [`WireError::Parse`] if the bytes cannot be deserialized into the
/// target type.
pub fn from_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, WireError> {
    ciborium::from_reader(data)
        .map_err(|e| WireError::Parse(format!("CBOR deserialization failed: {e}")))
}
