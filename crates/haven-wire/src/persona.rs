//! Personas, message actions, and the injectable wire-code table.
//!
//! A *persona* is the logical role a node plays for a given message: clients
//! speak as `MaidNode` or `DataGetter`, vault groups answer as one of the
//! manager personas. Every envelope carries an action code plus source and
//! destination persona codes as single bytes.
//!
//! The byte values themselves are deployment constants owned by the vault
//! side of the protocol, so they are injected through a [`WireTable`] rather
//! than baked into the enums. [`WireTable::default`] carries the pre-assigned
//! values below.

use serde::{Deserialize, Serialize};

use crate::WireError;

// ---------------------------------------------------------------------------
// Pre-assigned wire codes
// ---------------------------------------------------------------------------

/// Wire code for a get request (0x01).
pub const ACTION_GET_REQUEST: u8 = 0x01;
/// Wire code for a get response (0x02).
pub const ACTION_GET_RESPONSE: u8 = 0x02;
/// Wire code for a put request (0x03).
pub const ACTION_PUT_REQUEST: u8 = 0x03;
/// Wire code for a delete request (0x04).
pub const ACTION_DELETE_REQUEST: u8 = 0x04;
/// Wire code for a get-versions request (0x05).
pub const ACTION_GET_VERSIONS_REQUEST: u8 = 0x05;
/// Wire code for a get-versions response (0x06).
pub const ACTION_GET_VERSIONS_RESPONSE: u8 = 0x06;
/// Wire code for a get-branch request (0x07).
pub const ACTION_GET_BRANCH_REQUEST: u8 = 0x07;
/// Wire code for a get-branch response (0x08).
pub const ACTION_GET_BRANCH_RESPONSE: u8 = 0x08;
/// Wire code for a put-version request (0x09).
pub const ACTION_PUT_VERSION_REQUEST: u8 = 0x09;
/// Wire code for a put-version response (0x0A).
pub const ACTION_PUT_VERSION_RESPONSE: u8 = 0x0A;
/// Wire code for a delete-branch-until-fork request (0x0B).
pub const ACTION_DELETE_BRANCH_UNTIL_FORK_REQUEST: u8 = 0x0B;
/// Wire code for a create-account request (0x0C).
pub const ACTION_CREATE_ACCOUNT_REQUEST: u8 = 0x0C;
/// Wire code for a create-account response (0x0D).
pub const ACTION_CREATE_ACCOUNT_RESPONSE: u8 = 0x0D;
/// Wire code for a remove-account request (0x0E).
pub const ACTION_REMOVE_ACCOUNT_REQUEST: u8 = 0x0E;
/// Wire code for a remove-account response (0x0F).
pub const ACTION_REMOVE_ACCOUNT_RESPONSE: u8 = 0x0F;
/// Wire code for a register-pmid request (0x10).
pub const ACTION_REGISTER_PMID_REQUEST: u8 = 0x10;
/// Wire code for a register-pmid response (0x11).
pub const ACTION_REGISTER_PMID_RESPONSE: u8 = 0x11;
/// Wire code for an unregister-pmid request (0x12).
pub const ACTION_UNREGISTER_PMID_REQUEST: u8 = 0x12;
/// Wire code for an unregister-pmid response (0x13).
pub const ACTION_UNREGISTER_PMID_RESPONSE: u8 = 0x13;
/// Wire code for a get-pmid-health request (0x14).
pub const ACTION_GET_PMID_HEALTH_REQUEST: u8 = 0x14;
/// Wire code for a get-pmid-health response (0x15).
pub const ACTION_GET_PMID_HEALTH_RESPONSE: u8 = 0x15;

/// Wire code for the maid-node persona (0x00).
pub const PERSONA_MAID_NODE: u8 = 0x00;
/// Wire code for the maid-manager persona (0x01).
pub const PERSONA_MAID_MANAGER: u8 = 0x01;
/// Wire code for the data-manager persona (0x02).
pub const PERSONA_DATA_MANAGER: u8 = 0x02;
/// Wire code for the version-manager persona (0x03).
pub const PERSONA_VERSION_MANAGER: u8 = 0x03;
/// Wire code for the pmid-manager persona (0x04).
pub const PERSONA_PMID_MANAGER: u8 = 0x04;
/// Wire code for the pmid-node persona (0x05).
pub const PERSONA_PMID_NODE: u8 = 0x05;
/// Wire code for the data-getter persona (0x06).
pub const PERSONA_DATA_GETTER: u8 = 0x06;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Logical role a node plays for a given message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    /// A client acting with full account authority.
    MaidNode,
    /// The vault group managing a client account.
    MaidManager,
    /// The vault group managing a stored datum.
    DataManager,
    /// The vault group managing a mutable record's version history.
    VersionManager,
    /// The vault group managing a storage node's account.
    PmidManager,
    /// An individual storage node.
    PmidNode,
    /// A read-only client.
    DataGetter,
}

impl Persona {
    /// Every persona, in declaration order.
    pub const ALL: [Persona; 7] = [
        Persona::MaidNode,
        Persona::MaidManager,
        Persona::DataManager,
        Persona::VersionManager,
        Persona::PmidManager,
        Persona::PmidNode,
        Persona::DataGetter,
    ];
}

/// The semantic action of an envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageAction {
    /// Fetch a stored object.
    GetRequest,
    /// Reply to [`Self::GetRequest`].
    GetResponse,
    /// Publish an object (fire-and-forget).
    PutRequest,
    /// Remove an object (fire-and-forget).
    DeleteRequest,
    /// Fetch the version list of a mutable record.
    GetVersionsRequest,
    /// Reply to [`Self::GetVersionsRequest`].
    GetVersionsResponse,
    /// Fetch one branch of a mutable record's history.
    GetBranchRequest,
    /// Reply to [`Self::GetBranchRequest`].
    GetBranchResponse,
    /// Append a version to a mutable record.
    PutVersionRequest,
    /// Reply to [`Self::PutVersionRequest`].
    PutVersionResponse,
    /// Prune a history branch back to its fork point (fire-and-forget).
    DeleteBranchUntilForkRequest,
    /// Create the client account.
    CreateAccountRequest,
    /// Reply to [`Self::CreateAccountRequest`].
    CreateAccountResponse,
    /// Remove the client account.
    RemoveAccountRequest,
    /// Reply to [`Self::RemoveAccountRequest`].
    RemoveAccountResponse,
    /// Register a storage offer under a pmid.
    RegisterPmidRequest,
    /// Reply to [`Self::RegisterPmidRequest`].
    RegisterPmidResponse,
    /// Withdraw a storage offer.
    UnregisterPmidRequest,
    /// Reply to [`Self::UnregisterPmidRequest`].
    UnregisterPmidResponse,
    /// Query a storage node's health record.
    GetPmidHealthRequest,
    /// Reply to [`Self::GetPmidHealthRequest`].
    GetPmidHealthResponse,
}

impl MessageAction {
    /// Every action, in declaration order.
    pub const ALL: [MessageAction; 21] = [
        MessageAction::GetRequest,
        MessageAction::GetResponse,
        MessageAction::PutRequest,
        MessageAction::DeleteRequest,
        MessageAction::GetVersionsRequest,
        MessageAction::GetVersionsResponse,
        MessageAction::GetBranchRequest,
        MessageAction::GetBranchResponse,
        MessageAction::PutVersionRequest,
        MessageAction::PutVersionResponse,
        MessageAction::DeleteBranchUntilForkRequest,
        MessageAction::CreateAccountRequest,
        MessageAction::CreateAccountResponse,
        MessageAction::RemoveAccountRequest,
        MessageAction::RemoveAccountResponse,
        MessageAction::RegisterPmidRequest,
        MessageAction::RegisterPmidResponse,
        MessageAction::UnregisterPmidRequest,
        MessageAction::UnregisterPmidResponse,
        MessageAction::GetPmidHealthRequest,
        MessageAction::GetPmidHealthResponse,
    ];
}

// ---------------------------------------------------------------------------
// Wire-code table
// ---------------------------------------------------------------------------

/// The injected action/persona ↔ byte mapping used to encode envelopes.
///
/// Indexed by enum declaration order. Lookups from enum to code are
/// infallible; lookups from a wire byte return `None` for unassigned codes,
/// which the demultiplexer treats as a parse failure.
#[derive(Clone, Debug)]
pub struct WireTable {
    action_codes: [u8; MessageAction::ALL.len()],
    persona_codes: [u8; Persona::ALL.len()],
}

impl Default for WireTable {
    fn default() -> Self {
        Self {
            action_codes: [
                ACTION_GET_REQUEST,
                ACTION_GET_RESPONSE,
                ACTION_PUT_REQUEST,
                ACTION_DELETE_REQUEST,
                ACTION_GET_VERSIONS_REQUEST,
                ACTION_GET_VERSIONS_RESPONSE,
                ACTION_GET_BRANCH_REQUEST,
                ACTION_GET_BRANCH_RESPONSE,
                ACTION_PUT_VERSION_REQUEST,
                ACTION_PUT_VERSION_RESPONSE,
                ACTION_DELETE_BRANCH_UNTIL_FORK_REQUEST,
                ACTION_CREATE_ACCOUNT_REQUEST,
                ACTION_CREATE_ACCOUNT_RESPONSE,
                ACTION_REMOVE_ACCOUNT_REQUEST,
                ACTION_REMOVE_ACCOUNT_RESPONSE,
                ACTION_REGISTER_PMID_REQUEST,
                ACTION_REGISTER_PMID_RESPONSE,
                ACTION_UNREGISTER_PMID_REQUEST,
                ACTION_UNREGISTER_PMID_RESPONSE,
                ACTION_GET_PMID_HEALTH_REQUEST,
                ACTION_GET_PMID_HEALTH_RESPONSE,
            ],
            persona_codes: [
                PERSONA_MAID_NODE,
                PERSONA_MAID_MANAGER,
                PERSONA_DATA_MANAGER,
                PERSONA_VERSION_MANAGER,
                PERSONA_PMID_MANAGER,
                PERSONA_PMID_NODE,
                PERSONA_DATA_GETTER,
            ],
        }
    }
}

impl WireTable {
    /// Build a table from explicit code assignments.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidTable`] if any code is assigned twice
    /// within either namespace.
    pub fn new(
        action_codes: [u8; MessageAction::ALL.len()],
        persona_codes: [u8; Persona::ALL.len()],
    ) -> Result<Self, WireError> {
        check_unique("action", &action_codes)?;
        check_unique("persona", &persona_codes)?;
        Ok(Self {
            action_codes,
            persona_codes,
        })
    }

    /// The wire byte for an action.
    pub fn action_code(&self, action: MessageAction) -> u8 {
        self.action_codes[action as usize]
    }

    /// The action assigned to a wire byte, if any.
    pub fn action(&self, code: u8) -> Option<MessageAction> {
        MessageAction::ALL
            .iter()
            .copied()
            .find(|a| self.action_codes[*a as usize] == code)
    }

    /// The wire byte for a persona.
    pub fn persona_code(&self, persona: Persona) -> u8 {
        self.persona_codes[persona as usize]
    }

    /// The persona assigned to a wire byte, if any.
    pub fn persona(&self, code: u8) -> Option<Persona> {
        Persona::ALL
            .iter()
            .copied()
            .find(|p| self.persona_codes[*p as usize] == code)
    }
}

fn check_unique(namespace: &str, codes: &[u8]) -> Result<(), WireError> {
    for (i, code) in codes.iter().enumerate() {
        if codes[..i].contains(code) {
            return Err(WireError::InvalidTable(format!(
                "{namespace} code {code:#04x} assigned twice"
            )));
        }
    }
    Ok(())
}
