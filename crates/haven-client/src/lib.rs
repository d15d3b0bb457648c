//! # haven-client
//!
//! Request/response coordination core for a Haven network-filesystem client.
//!
//! A client issues data-plane operations by dispatching typed envelopes to
//! remote vault groups and aggregating the redundant replies that arrive
//! asynchronously through the routing layer:
//!
//! - **Pending-operation registry** keyed by task id, with deadlines and
//!   bounded expected-reply counts, via [`registry`]
//! - **Reply reducer** (first-to-quorum success, otherwise most-frequent
//!   error) via [`tally`]
//! - **Dispatcher** building typed outbound envelopes via [`dispatcher`]
//! - **Service demultiplexer** feeding inbound envelopes back into the
//!   registry via [`service`]
//! - **Operation facades** via [`maid_node`] and [`data_getter`]
//!
//! The routing layer itself, key material, and vault-side logic are external
//! collaborators reached through the [`router::Router`] trait and injected
//! identities.

pub mod config;
pub mod data_getter;
pub mod dispatcher;
pub mod maid_node;
pub mod registry;
pub mod router;
pub mod routes;
pub mod service;
pub mod tally;

use haven_wire::persona::Persona;
use haven_wire::replies::RemoteError;
use haven_wire::WireError;

/// Error types for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The deadline fired before a success quorum landed.
    #[error("operation timed out")]
    Timeout,

    /// The operation was cancelled locally.
    #[error("operation cancelled")]
    Cancelled,

    /// The remote group reported the data name is absent.
    #[error("no such element")]
    NoSuchElement,

    /// The remote group rejected the request.
    #[error("invalid parameter")]
    InvalidParameter,

    /// The remote group reported a code outside the known set.
    #[error("unknown remote error code {0}")]
    UnknownRemote(u16),

    /// An inbound envelope was addressed to a different persona. Soft
    /// failure: logged and dropped, never surfaced through a completion.
    #[error("envelope addressed to {got:?}, this client is {expected:?}")]
    PersonaMismatch {
        /// The persona this client answers to.
        expected: Persona,
        /// The persona the envelope named.
        got: Persona,
    },

    /// The registry was torn down while the operation was outstanding.
    #[error("client is shutting down")]
    Shutdown,

    /// An outbound payload or envelope failed to serialize, or a successful
    /// reply carried bytes the facade could not decode.
    #[error(transparent)]
    Wire(#[from] WireError),
}

impl ClientError {
    /// Translate a remote failure code into the typed error surfaced to the
    /// caller.
    pub fn from_remote(code: RemoteError) -> Self {
        match code {
            RemoteError::NoSuchElement => Self::NoSuchElement,
            RemoteError::InvalidParameter => Self::InvalidParameter,
            RemoteError::Success | RemoteError::Unknown(_) => Self::UnknownRemote(code.code()),
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
