//! The full-authority client facade.
//!
//! A [`MaidNode`] composes the registries, dispatcher, and service into the
//! public operation API. Every reply-expecting operation registers a pending
//! task with a success quorum of one and an expected reply count derived
//! from the routing group size, dispatches exactly one request envelope, and
//! resolves the completion into a typed result. Operation methods never
//! block; fire-and-forget operations return as soon as the envelope is
//! handed to the router.

use std::sync::Arc;

use haven_types::data::{DataName, DataVersion};
use haven_types::signing::SigningIdentity;
use haven_types::{Identity, NodeId, Receiver};
use haven_wire::cbor;
use haven_wire::payloads::{
    DataAndPmidHint, DataNameAndContent, PmidHealth, PmidRegistration,
};
use haven_wire::persona::WireTable;
use haven_wire::replies::{
    DataNameAndContentOrReturnCode, PmidHealthOrReturnCode, ReturnCode,
    StructuredDataNameAndContentOrReturnCode,
};

use crate::config::ClientConfig;
use crate::dispatcher::MaidNodeDispatcher;
use crate::registry::{Completion, Registry, ResponseFuture};
use crate::router::Router;
use crate::routes;
use crate::service::MaidNodeService;
use crate::{ClientError, Result};

/// A client node with full account authority.
///
/// Cheap to clone; clones share the registries and dispatcher. Must be
/// created within a tokio runtime.
#[derive(Clone)]
pub struct MaidNode {
    config: ClientConfig,
    signing: SigningIdentity,
    dispatcher: Arc<MaidNodeDispatcher>,
    service: Arc<MaidNodeService>,
    data: Registry<DataNameAndContentOrReturnCode>,
    versions: Registry<StructuredDataNameAndContentOrReturnCode>,
    acks: Registry<ReturnCode>,
    health: Registry<PmidHealthOrReturnCode>,
}

impl MaidNode {
    /// Create a client speaking as `MaidNode` with the given signing
    /// identity.
    pub fn new(
        router: Arc<dyn Router>,
        signing: SigningIdentity,
        table: WireTable,
        config: ClientConfig,
    ) -> Self {
        assert!(routes::tables_consistent());
        let table = Arc::new(table);
        let data = Registry::new(config.sweep_interval);
        let versions = Registry::new(config.sweep_interval);
        let acks = Registry::new(config.sweep_interval);
        let health = Registry::new(config.sweep_interval);
        let dispatcher = Arc::new(MaidNodeDispatcher::new(
            router,
            table.clone(),
            signing.name(),
        ));
        let service = Arc::new(MaidNodeService::new(
            table,
            data.clone(),
            versions.clone(),
            acks.clone(),
            health.clone(),
        ));
        Self {
            config,
            signing,
            dispatcher,
            service,
            data,
            versions,
            acks,
            health,
        }
    }

    /// Routing-layer delivery callback. Install once on the routing layer's
    /// inbound hook.
    pub fn handle_message(&self, bytes: &[u8], sender: NodeId, receiver: Receiver) {
        self.service.handle_message(bytes, sender, receiver);
    }

    /// Fetch a stored object.
    pub async fn get(&self, name: &DataName) -> Result<DataNameAndContent> {
        let (task_id, future) = self.add_task(&self.data);
        self.dispatcher.send_get_request(task_id, name)?;
        match await_reply(future).await? {
            DataNameAndContentOrReturnCode::Content(content) => Ok(content),
            DataNameAndContentOrReturnCode::Failure(rc) => Err(ClientError::from_remote(rc.code)),
        }
    }

    /// Publish an object, hinting a preferred storage node. Fire-and-forget.
    pub fn put(&self, data: DataNameAndContent, pmid_hint: Identity) -> Result<()> {
        let payload = DataAndPmidHint { data, pmid_hint };
        self.dispatcher.send_put_request(&payload)
    }

    /// Remove an object. Fire-and-forget.
    pub fn delete(&self, name: &DataName) -> Result<()> {
        self.dispatcher.send_delete_request(name)
    }

    /// Read a mutable record's version list.
    pub async fn get_versions(&self, name: &DataName) -> Result<Vec<DataVersion>> {
        let (task_id, future) = self.add_task(&self.versions);
        self.dispatcher.send_get_versions_request(task_id, name)?;
        decode_versions(await_reply(future).await?)
    }

    /// Read one branch of a mutable record's history, newest first from the
    /// given tip.
    pub async fn get_branch(
        &self,
        name: &DataName,
        branch_tip: &DataVersion,
    ) -> Result<Vec<DataVersion>> {
        let (task_id, future) = self.add_task(&self.versions);
        self.dispatcher
            .send_get_branch_request(task_id, name, branch_tip)?;
        decode_versions(await_reply(future).await?)
    }

    /// Append a version to a mutable record.
    pub async fn put_version(
        &self,
        name: &DataName,
        old_version: &DataVersion,
        new_version: &DataVersion,
    ) -> Result<()> {
        let (task_id, future) = self.add_task(&self.acks);
        self.dispatcher
            .send_put_version_request(task_id, name, old_version, new_version)?;
        ack(await_reply(future).await?)
    }

    /// Prune a history branch back to its fork point. Fire-and-forget.
    pub fn delete_branch_until_fork(
        &self,
        name: &DataName,
        branch_tip: &DataVersion,
    ) -> Result<()> {
        self.dispatcher
            .send_delete_branch_until_fork_request(name, branch_tip)
    }

    /// Create the client account.
    pub async fn create_account(&self) -> Result<()> {
        let (task_id, future) = self.add_task(&self.acks);
        self.dispatcher.send_create_account_request(task_id)?;
        ack(await_reply(future).await?)
    }

    /// Remove the client account.
    pub async fn remove_account(&self) -> Result<()> {
        let (task_id, future) = self.add_task(&self.acks);
        self.dispatcher.send_remove_account_request(task_id)?;
        ack(await_reply(future).await?)
    }

    /// Register a storage offer under the given pmid identity.
    pub async fn register_pmid(&self, pmid: &SigningIdentity) -> Result<()> {
        let registration = PmidRegistration::new(&self.signing, pmid, false);
        let (task_id, future) = self.add_task(&self.acks);
        self.dispatcher
            .send_register_pmid_request(task_id, &registration)?;
        ack(await_reply(future).await?)
    }

    /// Withdraw a storage offer.
    pub async fn unregister_pmid(&self, pmid: &SigningIdentity) -> Result<()> {
        let registration = PmidRegistration::new(&self.signing, pmid, true);
        let (task_id, future) = self.add_task(&self.acks);
        self.dispatcher
            .send_unregister_pmid_request(task_id, &registration)?;
        ack(await_reply(future).await?)
    }

    /// Query a storage node's health record.
    pub async fn get_pmid_health(&self, pmid_name: Identity) -> Result<PmidHealth> {
        let (task_id, future) = self.add_task(&self.health);
        self.dispatcher
            .send_get_pmid_health_request(task_id, pmid_name)?;
        match await_reply(future).await? {
            PmidHealthOrReturnCode::Health(health) => Ok(health),
            PmidHealthOrReturnCode::Failure(rc) => Err(ClientError::from_remote(rc.code)),
        }
    }

    /// The name of this client's signing identity.
    pub fn name(&self) -> Identity {
        self.signing.name()
    }

    fn add_task<R>(&self, registry: &Registry<R>) -> (haven_types::TaskId, ResponseFuture<R>)
    where
        R: haven_wire::replies::ReplyContents + Send + 'static,
    {
        registry.add_task(
            self.config.default_timeout,
            1,
            self.config.expected_reply_count(),
        )
    }
}

pub(crate) async fn await_reply<R>(future: ResponseFuture<R>) -> Result<R> {
    match future.await {
        Ok(Completion::Replied(reply)) => Ok(reply),
        Ok(Completion::TimedOut) => Err(ClientError::Timeout),
        Ok(Completion::Cancelled) => Err(ClientError::Cancelled),
        Err(_) => Err(ClientError::Shutdown),
    }
}

pub(crate) fn decode_versions(
    reply: StructuredDataNameAndContentOrReturnCode,
) -> Result<Vec<DataVersion>> {
    match reply {
        StructuredDataNameAndContentOrReturnCode::Content(content) => {
            Ok(cbor::from_slice(&content.content)?)
        }
        StructuredDataNameAndContentOrReturnCode::Failure(rc) => {
            Err(ClientError::from_remote(rc.code))
        }
    }
}

fn ack(reply: ReturnCode) -> Result<()> {
    if haven_wire::replies::ReplyContents::is_success(&reply) {
        Ok(())
    } else {
        Err(ClientError::from_remote(reply.code))
    }
}
