//! The read-only client facade.
//!
//! A [`DataGetter`] carries no signing identity and no account: it can fetch
//! objects and read version histories, nothing else. Deployments that ship a
//! list of well-known public pmid keys can seed it with them; fetches of
//! passport artifacts are then answered locally without touching the
//! network.

use std::sync::Arc;

use haven_types::data::{DataName, DataVersion};
use haven_types::{NodeId, Receiver};
use haven_wire::payloads::DataNameAndContent;
use haven_wire::persona::WireTable;
use haven_wire::replies::{
    DataNameAndContentOrReturnCode, StructuredDataNameAndContentOrReturnCode,
};

use crate::config::ClientConfig;
use crate::dispatcher::DataGetterDispatcher;
use crate::maid_node::{await_reply, decode_versions};
use crate::registry::Registry;
use crate::router::Router;
use crate::routes;
use crate::service::DataGetterService;
use crate::{ClientError, Result};

/// A client node restricted to fetches.
///
/// Cheap to clone; clones share the registries and dispatcher. Must be
/// created within a tokio runtime.
#[derive(Clone)]
pub struct DataGetter {
    config: ClientConfig,
    dispatcher: Arc<DataGetterDispatcher>,
    service: Arc<DataGetterService>,
    data: Registry<DataNameAndContentOrReturnCode>,
    versions: Registry<StructuredDataNameAndContentOrReturnCode>,
    known_public_pmids: Arc<Vec<DataNameAndContent>>,
}

impl DataGetter {
    /// Create a client speaking as `DataGetter`.
    ///
    /// `known_public_pmids` pre-seeds passport artifacts that are answered
    /// locally; pass an empty vec outside test deployments.
    pub fn new(
        router: Arc<dyn Router>,
        table: WireTable,
        config: ClientConfig,
        known_public_pmids: Vec<DataNameAndContent>,
    ) -> Self {
        assert!(routes::tables_consistent());
        let table = Arc::new(table);
        let data = Registry::new(config.sweep_interval);
        let versions = Registry::new(config.sweep_interval);
        let dispatcher = Arc::new(DataGetterDispatcher::new(router, table.clone()));
        let service = Arc::new(DataGetterService::new(
            table,
            data.clone(),
            versions.clone(),
        ));
        Self {
            config,
            dispatcher,
            service,
            data,
            versions,
            known_public_pmids: Arc::new(known_public_pmids),
        }
    }

    /// Routing-layer delivery callback. Install once on the routing layer's
    /// inbound hook.
    pub fn handle_message(&self, bytes: &[u8], sender: NodeId, receiver: Receiver) {
        self.service.handle_message(bytes, sender, receiver);
    }

    /// Fetch a stored object.
    pub async fn get(&self, name: &DataName) -> Result<DataNameAndContent> {
        if name.tag.is_passport() {
            if let Some(known) = self
                .known_public_pmids
                .iter()
                .find(|content| content.name == *name)
            {
                return Ok(known.clone());
            }
        }
        let (task_id, future) = self.data.add_task(
            self.config.default_timeout,
            1,
            self.config.expected_reply_count(),
        );
        self.dispatcher.send_get_request(task_id, name)?;
        match await_reply(future).await? {
            DataNameAndContentOrReturnCode::Content(content) => Ok(content),
            DataNameAndContentOrReturnCode::Failure(rc) => Err(ClientError::from_remote(rc.code)),
        }
    }

    /// Read a mutable record's version list.
    pub async fn get_versions(&self, name: &DataName) -> Result<Vec<DataVersion>> {
        let (task_id, future) = self.versions.add_task(
            self.config.default_timeout,
            1,
            self.config.expected_reply_count(),
        );
        self.dispatcher.send_get_versions_request(task_id, name)?;
        decode_versions(await_reply(future).await?)
    }

    /// Read one branch of a mutable record's history.
    pub async fn get_branch(
        &self,
        name: &DataName,
        branch_tip: &DataVersion,
    ) -> Result<Vec<DataVersion>> {
        let (task_id, future) = self.versions.add_task(
            self.config.default_timeout,
            1,
            self.config.expected_reply_count(),
        );
        self.dispatcher
            .send_get_branch_request(task_id, name, branch_tip)?;
        decode_versions(await_reply(future).await?)
    }
}
