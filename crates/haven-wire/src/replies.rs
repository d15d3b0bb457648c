//! Reply payloads: tagged value-or-return-code unions.
//!
//! Every reply a vault group sends is either the value the request asked for
//! or a [`ReturnCode`] carrying a structured [`RemoteError`]. The
//! [`ReplyContents`] trait pins down the success predicate per reply family
//! and the error-class bucket the response aggregator counts by.

use serde::{Deserialize, Serialize};

use crate::payloads::{DataNameAndContent, PmidHealth};
use crate::{WireError, WirePayload};

/// Structured error code reported by a remote group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteError {
    /// The operation succeeded.
    Success,
    /// The named data does not exist.
    NoSuchElement,
    /// The request was rejected (bad name, malformed version).
    InvalidParameter,
    /// A domain code outside the known set.
    Unknown(u16),
}

impl RemoteError {
    /// The numeric domain code.
    pub fn code(self) -> u16 {
        match self {
            Self::Success => 0,
            Self::NoSuchElement => 1,
            Self::InvalidParameter => 2,
            Self::Unknown(code) => code,
        }
    }
}

/// A remote group's verdict on an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnCode {
    /// The structured error code.
    pub code: RemoteError,
}

impl ReturnCode {
    /// A successful verdict.
    pub fn success() -> Self {
        Self {
            code: RemoteError::Success,
        }
    }

    /// A failing verdict with the given code.
    pub fn failure(code: RemoteError) -> Self {
        Self { code }
    }
}

impl WirePayload for ReturnCode {}

/// The equivalence class a reply is counted under by the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The distinguished ok bucket.
    Success,
    /// A failure bucket keyed by its structured code.
    Remote(RemoteError),
}

/// Classification of a reply for quorum counting.
pub trait ReplyContents {
    /// True iff the reply carries a value rather than a `ReturnCode`.
    fn is_success(&self) -> bool;

    /// The bucket this reply is counted under.
    fn error_class(&self) -> ErrorClass;
}

impl ReplyContents for ReturnCode {
    fn is_success(&self) -> bool {
        self.code == RemoteError::Success
    }

    fn error_class(&self) -> ErrorClass {
        if self.is_success() {
            ErrorClass::Success
        } else {
            ErrorClass::Remote(self.code)
        }
    }
}

/// Reply to a get: the object or a return code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataNameAndContentOrReturnCode {
    /// The fetched object.
    Content(DataNameAndContent),
    /// The group's failure verdict.
    Failure(ReturnCode),
}

impl WirePayload for DataNameAndContentOrReturnCode {
    fn validate(&self) -> Result<(), WireError> {
        match self {
            Self::Content(content) => content.validate(),
            Self::Failure(_) => Ok(()),
        }
    }
}

impl ReplyContents for DataNameAndContentOrReturnCode {
    fn is_success(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    fn error_class(&self) -> ErrorClass {
        match self {
            Self::Content(_) => ErrorClass::Success,
            Self::Failure(rc) => ErrorClass::Remote(rc.code),
        }
    }
}

/// Reply to a get-versions or get-branch: the serialised version list (the
/// content bytes of a [`DataNameAndContent`]) or a return code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuredDataNameAndContentOrReturnCode {
    /// The record name plus its serialised version list.
    Content(DataNameAndContent),
    /// The group's failure verdict.
    Failure(ReturnCode),
}

impl WirePayload for StructuredDataNameAndContentOrReturnCode {
    fn validate(&self) -> Result<(), WireError> {
        match self {
            Self::Content(content) => content.validate(),
            Self::Failure(_) => Ok(()),
        }
    }
}

impl ReplyContents for StructuredDataNameAndContentOrReturnCode {
    fn is_success(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    fn error_class(&self) -> ErrorClass {
        match self {
            Self::Content(_) => ErrorClass::Success,
            Self::Failure(rc) => ErrorClass::Remote(rc.code),
        }
    }
}

/// Reply to a get-pmid-health: the health record or a return code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PmidHealthOrReturnCode {
    /// The storage node's health record.
    Health(PmidHealth),
    /// The group's failure verdict.
    Failure(ReturnCode),
}

impl WirePayload for PmidHealthOrReturnCode {}

impl ReplyContents for PmidHealthOrReturnCode {
    fn is_success(&self) -> bool {
        matches!(self, Self::Health(_))
    }

    fn error_class(&self) -> ErrorClass {
        match self {
            Self::Health(_) => ErrorClass::Success,
            Self::Failure(rc) => ErrorClass::Remote(rc.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_types::data::{DataName, DataTagValue};

    fn content_reply() -> DataNameAndContentOrReturnCode {
        let name = DataName::new(DataTagValue::ImmutableData, [1; 32]);
        DataNameAndContentOrReturnCode::Content(
            DataNameAndContent::new(name, b"hello".to_vec()).expect("valid"),
        )
    }

    #[test]
    fn test_return_code_success_predicate() {
        assert!(ReturnCode::success().is_success());
        assert!(!ReturnCode::failure(RemoteError::NoSuchElement).is_success());
        assert_eq!(ReturnCode::success().error_class(), ErrorClass::Success);
        assert_eq!(
            ReturnCode::failure(RemoteError::InvalidParameter).error_class(),
            ErrorClass::Remote(RemoteError::InvalidParameter)
        );
    }

    #[test]
    fn test_remote_error_codes() {
        assert_eq!(RemoteError::Success.code(), 0);
        assert_eq!(RemoteError::NoSuchElement.code(), 1);
        assert_eq!(RemoteError::InvalidParameter.code(), 2);
        assert_eq!(RemoteError::Unknown(77).code(), 77);
    }

    #[test]
    fn test_content_reply_roundtrip() {
        let reply = content_reply();
        assert!(reply.is_success());
        let bytes = reply.serialise().expect("serialise");
        assert_eq!(
            DataNameAndContentOrReturnCode::parse(&bytes).expect("parse"),
            reply
        );
    }

    #[test]
    fn test_failure_reply_roundtrip() {
        let reply =
            DataNameAndContentOrReturnCode::Failure(ReturnCode::failure(RemoteError::NoSuchElement));
        assert!(!reply.is_success());
        let bytes = reply.serialise().expect("serialise");
        assert_eq!(
            DataNameAndContentOrReturnCode::parse(&bytes).expect("parse"),
            reply
        );
    }

    #[test]
    fn test_content_reply_invariant_enforced_on_parse() {
        let name = DataName::new(DataTagValue::ImmutableData, [1; 32]);
        let invalid = DataNameAndContentOrReturnCode::Content(DataNameAndContent {
            name,
            content: vec![],
        });
        let bytes = crate::cbor::to_vec(&invalid).expect("encode");
        assert!(DataNameAndContentOrReturnCode::parse(&bytes).is_err());
    }

    #[test]
    fn test_structured_reply_roundtrip() {
        let name = DataName::new(DataTagValue::MutableData, [5; 32]);
        let reply = StructuredDataNameAndContentOrReturnCode::Content(
            DataNameAndContent::new(name, vec![0x83, 0x01, 0x02, 0x03]).expect("valid"),
        );
        let bytes = reply.serialise().expect("serialise");
        assert_eq!(
            StructuredDataNameAndContentOrReturnCode::parse(&bytes).expect("parse"),
            reply
        );
    }

    #[test]
    fn test_pmid_health_reply_classes() {
        let ok = PmidHealthOrReturnCode::Health(PmidHealth {
            serialised: vec![1],
        });
        assert!(ok.is_success());
        assert_eq!(ok.error_class(), ErrorClass::Success);

        let failed =
            PmidHealthOrReturnCode::Failure(ReturnCode::failure(RemoteError::Unknown(500)));
        assert!(!failed.is_success());
        assert_eq!(
            failed.error_class(),
            ErrorClass::Remote(RemoteError::Unknown(500))
        );
    }

    #[test]
    fn test_unknown_code_survives_roundtrip() {
        let reply = ReturnCode::failure(RemoteError::Unknown(0xBEEF));
        let bytes = reply.serialise().expect("serialise");
        assert_eq!(ReturnCode::parse(&bytes).expect("parse"), reply);
    }
}
