//! Static message routing table.
//!
//! Each logical operation has a compile-time-fixed binding of request action,
//! response action, source persona, and destination persona. The binding
//! lives in one table per client persona so the dispatchers do a small
//! lookup instead of scattering the associations across call sites, and so
//! the whole table can be checked for internal consistency at startup.

use haven_wire::persona::{MessageAction, Persona};

/// Closed enum of client-facing operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// Fetch immutable or mutable data.
    Get,
    /// Publish data (fire-and-forget).
    Put,
    /// Remove data (fire-and-forget).
    Delete,
    /// Read a mutable record's version list.
    GetVersions,
    /// Read one branch of a mutable record's history.
    GetBranch,
    /// Append a version to a mutable record.
    PutVersion,
    /// Prune a history branch (fire-and-forget).
    DeleteBranchUntilFork,
    /// Create the client account.
    CreateAccount,
    /// Remove the client account.
    RemoveAccount,
    /// Register a storage offer.
    RegisterPmid,
    /// Withdraw a storage offer.
    UnregisterPmid,
    /// Query a storage node's health.
    GetPmidHealth,
}

/// One row of the routing table.
#[derive(Clone, Copy, Debug)]
pub struct Route {
    /// The operation this row describes.
    pub kind: MessageKind,
    /// Action code of the outbound request.
    pub request: MessageAction,
    /// Action code of the expected reply; `None` for fire-and-forget.
    pub response: Option<MessageAction>,
    /// Persona the client sends as.
    pub source: Persona,
    /// Persona group the request is addressed to.
    pub destination: Persona,
}

/// Routes available to a full-authority `MaidNode` client.
pub static MAID_NODE_ROUTES: [Route; 12] = [
    Route {
        kind: MessageKind::Get,
        request: MessageAction::GetRequest,
        response: Some(MessageAction::GetResponse),
        source: Persona::MaidNode,
        destination: Persona::DataManager,
    },
    Route {
        kind: MessageKind::Put,
        request: MessageAction::PutRequest,
        response: None,
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::Delete,
        request: MessageAction::DeleteRequest,
        response: None,
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::GetVersions,
        request: MessageAction::GetVersionsRequest,
        response: Some(MessageAction::GetVersionsResponse),
        source: Persona::MaidNode,
        destination: Persona::VersionManager,
    },
    Route {
        kind: MessageKind::GetBranch,
        request: MessageAction::GetBranchRequest,
        response: Some(MessageAction::GetBranchResponse),
        source: Persona::MaidNode,
        destination: Persona::VersionManager,
    },
    Route {
        kind: MessageKind::PutVersion,
        request: MessageAction::PutVersionRequest,
        response: Some(MessageAction::PutVersionResponse),
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::DeleteBranchUntilFork,
        request: MessageAction::DeleteBranchUntilForkRequest,
        response: None,
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::CreateAccount,
        request: MessageAction::CreateAccountRequest,
        response: Some(MessageAction::CreateAccountResponse),
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::RemoveAccount,
        request: MessageAction::RemoveAccountRequest,
        response: Some(MessageAction::RemoveAccountResponse),
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::RegisterPmid,
        request: MessageAction::RegisterPmidRequest,
        response: Some(MessageAction::RegisterPmidResponse),
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::UnregisterPmid,
        request: MessageAction::UnregisterPmidRequest,
        response: Some(MessageAction::UnregisterPmidResponse),
        source: Persona::MaidNode,
        destination: Persona::MaidManager,
    },
    Route {
        kind: MessageKind::GetPmidHealth,
        request: MessageAction::GetPmidHealthRequest,
        response: Some(MessageAction::GetPmidHealthResponse),
        source: Persona::MaidNode,
        destination: Persona::PmidManager,
    },
];

/// Routes available to a read-only `DataGetter` client.
pub static DATA_GETTER_ROUTES: [Route; 3] = [
    Route {
        kind: MessageKind::Get,
        request: MessageAction::GetRequest,
        response: Some(MessageAction::GetResponse),
        source: Persona::DataGetter,
        destination: Persona::DataManager,
    },
    Route {
        kind: MessageKind::GetVersions,
        request: MessageAction::GetVersionsRequest,
        response: Some(MessageAction::GetVersionsResponse),
        source: Persona::DataGetter,
        destination: Persona::VersionManager,
    },
    Route {
        kind: MessageKind::GetBranch,
        request: MessageAction::GetBranchRequest,
        response: Some(MessageAction::GetBranchResponse),
        source: Persona::DataGetter,
        destination: Persona::VersionManager,
    },
];

/// Look up the route for an operation sent as `source`.
///
/// Dispatching an operation outside the source persona's table is a
/// programmer error and aborts.
pub fn route(source: Persona, kind: MessageKind) -> &'static Route {
    let table: &'static [Route] = match source {
        Persona::MaidNode => &MAID_NODE_ROUTES,
        Persona::DataGetter => &DATA_GETTER_ROUTES,
        _ => &[],
    };
    let Some(found) = table.iter().find(|r| r.kind == kind) else {
        unreachable!("no route for {kind:?} as {source:?}");
    };
    found
}

/// Check every table row for internal consistency. Called once at facade
/// construction; also exercised directly by tests.
pub fn tables_consistent() -> bool {
    let client_personas = [Persona::MaidNode, Persona::DataGetter];
    for (persona, table) in [
        (Persona::MaidNode, MAID_NODE_ROUTES.as_slice()),
        (Persona::DataGetter, DATA_GETTER_ROUTES.as_slice()),
    ] {
        for (i, row) in table.iter().enumerate() {
            // Source pinned to the table's persona; destination is a vault
            // group, never a client persona; one row per kind.
            if row.source != persona
                || client_personas.contains(&row.destination)
                || table[..i].iter().any(|other| other.kind == row.kind)
            {
                return false;
            }
        }
    }
    true
}
