//! Inbound message demultiplexers.
//!
//! Every delivery from the routing layer lands here as raw bytes plus the
//! sender/receiver binding. The service parses the envelope, verifies the
//! destination persona, typed-parses the payload for the `(action, source
//! persona)` pair, and feeds it into the matching registry by message id.
//!
//! All failures on this path are soft: a malformed envelope, a misaddressed
//! persona, or an unroutable action is logged at warning level and dropped.
//! No task id from corrupt bytes can be trusted, so nothing is surfaced to a
//! completion sink.

use haven_types::{short_id, NodeId, Receiver};
use haven_wire::envelope::Envelope;
use haven_wire::persona::{MessageAction, Persona, WireTable};
use haven_wire::replies::{
    DataNameAndContentOrReturnCode, PmidHealthOrReturnCode, ReplyContents, ReturnCode,
    StructuredDataNameAndContentOrReturnCode,
};
use haven_wire::WirePayload;
use std::sync::Arc;
use tracing::warn;

use crate::registry::Registry;
use crate::ClientError;

/// Demultiplexer for a `MaidNode` client.
pub struct MaidNodeService {
    table: Arc<WireTable>,
    data: Registry<DataNameAndContentOrReturnCode>,
    versions: Registry<StructuredDataNameAndContentOrReturnCode>,
    acks: Registry<ReturnCode>,
    health: Registry<PmidHealthOrReturnCode>,
}

impl MaidNodeService {
    /// Create a service feeding the given reply registries.
    pub fn new(
        table: Arc<WireTable>,
        data: Registry<DataNameAndContentOrReturnCode>,
        versions: Registry<StructuredDataNameAndContentOrReturnCode>,
        acks: Registry<ReturnCode>,
        health: Registry<PmidHealthOrReturnCode>,
    ) -> Self {
        Self {
            table,
            data,
            versions,
            acks,
            health,
        }
    }

    /// Routing-layer delivery callback.
    pub fn handle_message(&self, bytes: &[u8], sender: NodeId, _receiver: Receiver) {
        let Some(envelope) = parse_inbound(bytes, &self.table, Persona::MaidNode, &sender) else {
            return;
        };
        match (envelope.action, envelope.source) {
            (MessageAction::GetResponse, Persona::DataManager) => feed(&self.data, &envelope),
            (
                MessageAction::GetVersionsResponse | MessageAction::GetBranchResponse,
                Persona::VersionManager,
            ) => feed(&self.versions, &envelope),
            (
                MessageAction::PutVersionResponse
                | MessageAction::CreateAccountResponse
                | MessageAction::RemoveAccountResponse
                | MessageAction::RegisterPmidResponse
                | MessageAction::UnregisterPmidResponse,
                Persona::MaidManager,
            ) => feed(&self.acks, &envelope),
            (MessageAction::GetPmidHealthResponse, Persona::PmidManager) => {
                feed(&self.health, &envelope)
            }
            (action, source) => {
                warn!(?action, ?source, "no handler for inbound message; dropped");
            }
        }
    }
}

/// Demultiplexer for a read-only `DataGetter` client.
pub struct DataGetterService {
    table: Arc<WireTable>,
    data: Registry<DataNameAndContentOrReturnCode>,
    versions: Registry<StructuredDataNameAndContentOrReturnCode>,
}

impl DataGetterService {
    /// Create a service feeding the given reply registries.
    pub fn new(
        table: Arc<WireTable>,
        data: Registry<DataNameAndContentOrReturnCode>,
        versions: Registry<StructuredDataNameAndContentOrReturnCode>,
    ) -> Self {
        Self {
            table,
            data,
            versions,
        }
    }

    /// Routing-layer delivery callback.
    pub fn handle_message(&self, bytes: &[u8], sender: NodeId, _receiver: Receiver) {
        let Some(envelope) = parse_inbound(bytes, &self.table, Persona::DataGetter, &sender)
        else {
            return;
        };
        match (envelope.action, envelope.source) {
            (MessageAction::GetResponse, Persona::DataManager) => feed(&self.data, &envelope),
            (
                MessageAction::GetVersionsResponse | MessageAction::GetBranchResponse,
                Persona::VersionManager,
            ) => feed(&self.versions, &envelope),
            (action, source) => {
                warn!(?action, ?source, "no handler for inbound message; dropped");
            }
        }
    }
}

/// Parse an inbound envelope and verify its destination persona.
///
/// # Errors
///
/// Returns [`ClientError::PersonaMismatch`] for a misaddressed envelope and
/// [`ClientError::Wire`] for malformed bytes.
pub(crate) fn checked_parse(
    bytes: &[u8],
    table: &WireTable,
    expected: Persona,
) -> crate::Result<Envelope> {
    let envelope = Envelope::parse(bytes, table)?;
    if envelope.destination != expected {
        return Err(ClientError::PersonaMismatch {
            expected,
            got: envelope.destination,
        });
    }
    Ok(envelope)
}

fn parse_inbound(
    bytes: &[u8],
    table: &WireTable,
    expected: Persona,
    sender: &NodeId,
) -> Option<Envelope> {
    match checked_parse(bytes, table, expected) {
        Ok(envelope) => Some(envelope),
        Err(error) => {
            warn!(sender = %short_id(sender), %error, "inbound envelope dropped");
            None
        }
    }
}

fn feed<R>(registry: &Registry<R>, envelope: &Envelope)
where
    R: WirePayload + ReplyContents + Send + 'static,
{
    match R::parse(&envelope.payload) {
        Ok(reply) => registry.add_response(envelope.message_id, reply),
        Err(error) => {
            warn!(
                message_id = envelope.message_id,
                action = ?envelope.action,
                %error,
                "reply payload failed to parse; dropped"
            );
        }
    }
}
