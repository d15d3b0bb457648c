//! Outbound request dispatchers.
//!
//! A dispatcher owns no per-operation state: it fixes the envelope binding
//! for each operation from the static routing table, serializes the payload,
//! and hands the encoded envelope to the router. It never waits and never
//! sees replies.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use haven_types::data::{DataName, DataTagValue, DataVersion};
use haven_types::{GroupId, Identity, MessageId, Receiver, TaskId};
use haven_wire::envelope::{CacheHint, Envelope};
use haven_wire::payloads::{
    DataAndPmidHint, DataNameAndVersion, DataNameOldNewVersion, Empty, PmidRegistration,
};
use haven_wire::persona::{Persona, WireTable};
use haven_wire::WirePayload;
use tracing::debug;

use crate::router::Router;
use crate::routes::{self, MessageKind};
use crate::Result;

/// Dispatcher for a full-authority `MaidNode` client.
///
/// Account-scoped operations go to the maid-manager group around the signing
/// identity's name; data-keyed operations go to the group around the data
/// name.
pub struct MaidNodeDispatcher {
    router: Arc<dyn Router>,
    table: Arc<WireTable>,
    maid_manager_group: GroupId,
    next_oneway_id: AtomicU32,
}

impl MaidNodeDispatcher {
    /// Create a dispatcher for the client whose signing identity has
    /// `client_name`.
    pub fn new(router: Arc<dyn Router>, table: Arc<WireTable>, client_name: Identity) -> Self {
        Self {
            router,
            table,
            maid_manager_group: client_name,
            next_oneway_id: AtomicU32::new(0),
        }
    }

    /// Fetch a stored object.
    pub fn send_get_request(&self, task_id: TaskId, name: &DataName) -> Result<()> {
        self.dispatch(
            MessageKind::Get,
            task_id,
            Receiver::Group(name.raw_name),
            name.serialise()?,
            CacheHint::for_get(name.tag),
        )
    }

    /// Publish an object. Fire-and-forget.
    pub fn send_put_request(&self, data: &DataAndPmidHint) -> Result<()> {
        self.dispatch(
            MessageKind::Put,
            self.oneway_id(),
            Receiver::Group(self.maid_manager_group),
            data.serialise()?,
            CacheHint::None,
        )
    }

    /// Remove an object. Fire-and-forget.
    pub fn send_delete_request(&self, name: &DataName) -> Result<()> {
        self.dispatch(
            MessageKind::Delete,
            self.oneway_id(),
            Receiver::Group(self.maid_manager_group),
            name.serialise()?,
            CacheHint::None,
        )
    }

    /// Read a mutable record's version list.
    pub fn send_get_versions_request(&self, task_id: TaskId, name: &DataName) -> Result<()> {
        self.dispatch(
            MessageKind::GetVersions,
            task_id,
            Receiver::Group(name.raw_name),
            name.serialise()?,
            CacheHint::None,
        )
    }

    /// Read one branch of a mutable record's history.
    pub fn send_get_branch_request(
        &self,
        task_id: TaskId,
        name: &DataName,
        branch_tip: &DataVersion,
    ) -> Result<()> {
        let payload = DataNameAndVersion {
            name: *name,
            version: *branch_tip,
        };
        self.dispatch(
            MessageKind::GetBranch,
            task_id,
            Receiver::Group(name.raw_name),
            payload.serialise()?,
            CacheHint::None,
        )
    }

    /// Append a version to a mutable record.
    pub fn send_put_version_request(
        &self,
        task_id: TaskId,
        name: &DataName,
        old_version: &DataVersion,
        new_version: &DataVersion,
    ) -> Result<()> {
        let payload = DataNameOldNewVersion {
            name: *name,
            old_version: *old_version,
            new_version: *new_version,
        };
        self.dispatch(
            MessageKind::PutVersion,
            task_id,
            Receiver::Group(self.maid_manager_group),
            payload.serialise()?,
            CacheHint::None,
        )
    }

    /// Prune a history branch back to its fork point. Fire-and-forget.
    pub fn send_delete_branch_until_fork_request(
        &self,
        name: &DataName,
        branch_tip: &DataVersion,
    ) -> Result<()> {
        let payload = DataNameAndVersion {
            name: *name,
            version: *branch_tip,
        };
        self.dispatch(
            MessageKind::DeleteBranchUntilFork,
            self.oneway_id(),
            Receiver::Group(self.maid_manager_group),
            payload.serialise()?,
            CacheHint::None,
        )
    }

    /// Create the client account.
    pub fn send_create_account_request(&self, task_id: TaskId) -> Result<()> {
        self.dispatch(
            MessageKind::CreateAccount,
            task_id,
            Receiver::Group(self.maid_manager_group),
            Empty.serialise()?,
            CacheHint::None,
        )
    }

    /// Remove the client account.
    pub fn send_remove_account_request(&self, task_id: TaskId) -> Result<()> {
        self.dispatch(
            MessageKind::RemoveAccount,
            task_id,
            Receiver::Group(self.maid_manager_group),
            Empty.serialise()?,
            CacheHint::None,
        )
    }

    /// Register a storage offer.
    pub fn send_register_pmid_request(
        &self,
        task_id: TaskId,
        registration: &PmidRegistration,
    ) -> Result<()> {
        self.dispatch(
            MessageKind::RegisterPmid,
            task_id,
            Receiver::Group(self.maid_manager_group),
            registration.serialise()?,
            CacheHint::None,
        )
    }

    /// Withdraw a storage offer.
    pub fn send_unregister_pmid_request(
        &self,
        task_id: TaskId,
        registration: &PmidRegistration,
    ) -> Result<()> {
        self.dispatch(
            MessageKind::UnregisterPmid,
            task_id,
            Receiver::Group(self.maid_manager_group),
            registration.serialise()?,
            CacheHint::None,
        )
    }

    /// Query a storage node's health record.
    pub fn send_get_pmid_health_request(&self, task_id: TaskId, pmid_name: Identity) -> Result<()> {
        let payload = DataName::new(DataTagValue::Pmid, pmid_name);
        self.dispatch(
            MessageKind::GetPmidHealth,
            task_id,
            Receiver::Group(pmid_name),
            payload.serialise()?,
            CacheHint::None,
        )
    }

    fn oneway_id(&self) -> MessageId {
        self.next_oneway_id.fetch_add(1, Ordering::Relaxed)
    }

    fn dispatch(
        &self,
        kind: MessageKind,
        message_id: MessageId,
        receiver: Receiver,
        payload: Vec<u8>,
        cache_hint: CacheHint,
    ) -> Result<()> {
        send(
            &*self.router,
            &self.table,
            Persona::MaidNode,
            kind,
            message_id,
            receiver,
            payload,
            cache_hint,
        )
    }
}

/// Dispatcher for a read-only `DataGetter` client.
pub struct DataGetterDispatcher {
    router: Arc<dyn Router>,
    table: Arc<WireTable>,
}

impl DataGetterDispatcher {
    /// Create a dispatcher speaking as `DataGetter`.
    pub fn new(router: Arc<dyn Router>, table: Arc<WireTable>) -> Self {
        Self { router, table }
    }

    /// Fetch a stored object.
    pub fn send_get_request(&self, task_id: TaskId, name: &DataName) -> Result<()> {
        self.dispatch(
            MessageKind::Get,
            task_id,
            Receiver::Group(name.raw_name),
            name.serialise()?,
            CacheHint::for_get(name.tag),
        )
    }

    /// Read a mutable record's version list.
    pub fn send_get_versions_request(&self, task_id: TaskId, name: &DataName) -> Result<()> {
        self.dispatch(
            MessageKind::GetVersions,
            task_id,
            Receiver::Group(name.raw_name),
            name.serialise()?,
            CacheHint::None,
        )
    }

    /// Read one branch of a mutable record's history.
    pub fn send_get_branch_request(
        &self,
        task_id: TaskId,
        name: &DataName,
        branch_tip: &DataVersion,
    ) -> Result<()> {
        let payload = DataNameAndVersion {
            name: *name,
            version: *branch_tip,
        };
        self.dispatch(
            MessageKind::GetBranch,
            task_id,
            Receiver::Group(name.raw_name),
            payload.serialise()?,
            CacheHint::None,
        )
    }

    fn dispatch(
        &self,
        kind: MessageKind,
        message_id: MessageId,
        receiver: Receiver,
        payload: Vec<u8>,
        cache_hint: CacheHint,
    ) -> Result<()> {
        send(
            &*self.router,
            &self.table,
            Persona::DataGetter,
            kind,
            message_id,
            receiver,
            payload,
            cache_hint,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn send(
    router: &dyn Router,
    table: &WireTable,
    source: Persona,
    kind: MessageKind,
    message_id: MessageId,
    receiver: Receiver,
    payload: Vec<u8>,
    cache_hint: CacheHint,
) -> Result<()> {
    let route = routes::route(source, kind);
    debug_assert_eq!(route.source, source);
    let envelope = Envelope {
        action: route.request,
        source: route.source,
        destination: route.destination,
        message_id,
        payload,
    };
    let bytes = envelope.encode(table)?;
    debug!(?kind, message_id, destination = ?route.destination, "dispatching request");
    router.send(receiver, bytes, cache_hint);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use haven_wire::persona::MessageAction;

    #[derive(Default)]
    struct CapturingRouter {
        sent: Mutex<Vec<(Receiver, Vec<u8>, CacheHint)>>,
    }

    impl Router for CapturingRouter {
        fn send(&self, receiver: Receiver, message: Vec<u8>, cache_hint: CacheHint) {
            self.sent
                .lock()
                .expect("router lock")
                .push((receiver, message, cache_hint));
        }
    }

    fn setup() -> (Arc<CapturingRouter>, MaidNodeDispatcher, Arc<WireTable>) {
        let router = Arc::new(CapturingRouter::default());
        let table = Arc::new(WireTable::default());
        let dispatcher =
            MaidNodeDispatcher::new(router.clone(), table.clone(), [0xCC; 32]);
        (router, dispatcher, table)
    }

    fn immutable_name(byte: u8) -> DataName {
        DataName::new(DataTagValue::ImmutableData, [byte; 32])
    }

    #[test]
    fn test_get_targets_data_group_and_is_cacheable() {
        let (router, dispatcher, table) = setup();
        let name = immutable_name(7);
        dispatcher.send_get_request(99, &name).expect("dispatch");

        let sent = router.sent.lock().expect("router lock");
        let (receiver, bytes, hint) = &sent[0];
        assert_eq!(*receiver, Receiver::Group([7; 32]));
        assert_eq!(*hint, CacheHint::GetCacheable);

        let envelope = Envelope::parse(bytes, &table).expect("parse");
        assert_eq!(envelope.action, MessageAction::GetRequest);
        assert_eq!(envelope.source, Persona::MaidNode);
        assert_eq!(envelope.destination, Persona::DataManager);
        assert_eq!(envelope.message_id, 99);
        assert_eq!(DataName::parse(&envelope.payload).expect("payload"), name);
    }

    #[test]
    fn test_mutable_get_is_not_cacheable() {
        let (router, dispatcher, _table) = setup();
        let name = DataName::new(DataTagValue::MutableData, [7; 32]);
        dispatcher.send_get_request(1, &name).expect("dispatch");
        let sent = router.sent.lock().expect("router lock");
        assert_eq!(sent[0].2, CacheHint::None);
    }

    #[test]
    fn test_account_ops_target_maid_manager_group() {
        let (router, dispatcher, table) = setup();
        dispatcher.send_create_account_request(5).expect("dispatch");

        let sent = router.sent.lock().expect("router lock");
        let (receiver, bytes, _) = &sent[0];
        // The maid-manager group sits around the signing identity's name.
        assert_eq!(*receiver, Receiver::Group([0xCC; 32]));
        let envelope = Envelope::parse(bytes, &table).expect("parse");
        assert_eq!(envelope.action, MessageAction::CreateAccountRequest);
        assert_eq!(envelope.destination, Persona::MaidManager);
        assert!(envelope.payload.is_empty());
    }

    #[test]
    fn test_oneway_ids_are_distinct() {
        let (router, dispatcher, table) = setup();
        let name = immutable_name(1);
        dispatcher.send_delete_request(&name).expect("dispatch");
        dispatcher.send_delete_request(&name).expect("dispatch");

        let sent = router.sent.lock().expect("router lock");
        let a = Envelope::parse(&sent[0].1, &table).expect("parse");
        let b = Envelope::parse(&sent[1].1, &table).expect("parse");
        assert_ne!(a.message_id, b.message_id);
    }

    #[test]
    fn test_put_version_targets_maid_manager() {
        let (router, dispatcher, table) = setup();
        let name = DataName::new(DataTagValue::MutableData, [3; 32]);
        let old = DataVersion::new([4; 32], 1);
        let new = DataVersion::new([5; 32], 2);
        dispatcher
            .send_put_version_request(11, &name, &old, &new)
            .expect("dispatch");

        let sent = router.sent.lock().expect("router lock");
        let envelope = Envelope::parse(&sent[0].1, &table).expect("parse");
        assert_eq!(envelope.destination, Persona::MaidManager);
        let payload = DataNameOldNewVersion::parse(&envelope.payload).expect("payload");
        assert_eq!(payload.old_version, old);
        assert_eq!(payload.new_version, new);
    }

    #[test]
    fn test_pmid_health_targets_pmid_manager_group() {
        let (router, dispatcher, table) = setup();
        dispatcher
            .send_get_pmid_health_request(21, [0xAB; 32])
            .expect("dispatch");

        let sent = router.sent.lock().expect("router lock");
        let (receiver, bytes, _) = &sent[0];
        assert_eq!(*receiver, Receiver::Group([0xAB; 32]));
        let envelope = Envelope::parse(bytes, &table).expect("parse");
        assert_eq!(envelope.destination, Persona::PmidManager);
        let payload = DataName::parse(&envelope.payload).expect("payload");
        assert_eq!(payload.tag, DataTagValue::Pmid);
    }

    #[test]
    fn test_data_getter_speaks_as_data_getter() {
        let router = Arc::new(CapturingRouter::default());
        let table = Arc::new(WireTable::default());
        let dispatcher = DataGetterDispatcher::new(router.clone(), table.clone());
        dispatcher
            .send_get_request(3, &immutable_name(9))
            .expect("dispatch");

        let sent = router.sent.lock().expect("router lock");
        let envelope = Envelope::parse(&sent[0].1, &table).expect("parse");
        assert_eq!(envelope.source, Persona::DataGetter);
        assert_eq!(envelope.destination, Persona::DataManager);
    }
}
