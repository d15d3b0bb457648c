//! Integration test: the read-only DataGetter facade.

use std::sync::Arc;

use haven_client::config::ClientConfig;
use haven_client::data_getter::DataGetter;
use haven_integration_tests::{init_tracing, reply_envelope, wait_for_sends, CapturingRouter};
use haven_types::data::{DataName, DataTagValue, DataVersion};
use haven_types::Receiver;
use haven_wire::envelope::Envelope;
use haven_wire::payloads::DataNameAndContent;
use haven_wire::persona::{MessageAction, Persona, WireTable};
use haven_wire::replies::{
    DataNameAndContentOrReturnCode, StructuredDataNameAndContentOrReturnCode,
};
use haven_wire::WirePayload;

fn new_getter(router: Arc<CapturingRouter>) -> DataGetter {
    DataGetter::new(
        router,
        WireTable::default(),
        ClientConfig::default(),
        vec![],
    )
}

#[tokio::test]
async fn get_speaks_as_data_getter() {
    init_tracing();
    let router = Arc::new(CapturingRouter::default());
    let getter = new_getter(router.clone());
    let table = WireTable::default();
    let name = DataName::new(DataTagValue::ImmutableData, [0x12; 32]);

    let task = tokio::spawn({
        let getter = getter.clone();
        async move { getter.get(&name).await }
    });

    let sent = wait_for_sends(&router, 1).await;
    let request = Envelope::parse(&sent[0].bytes, &table).expect("parse request");
    assert_eq!(request.source, Persona::DataGetter);
    assert_eq!(request.destination, Persona::DataManager);
    assert_eq!(sent[0].receiver, Receiver::Group([0x12; 32]));

    let reply = DataNameAndContentOrReturnCode::Content(
        DataNameAndContent::new(name, b"read only".to_vec()).expect("valid"),
    );
    let bytes = reply_envelope(
        &table,
        MessageAction::GetResponse,
        Persona::DataManager,
        Persona::DataGetter,
        request.message_id,
        reply.serialise().expect("serialise"),
    );
    getter.handle_message(&bytes, [0xEE; 32], Receiver::Node([0; 32]));

    let content = task.await.expect("join").expect("get succeeds");
    assert_eq!(content.content, b"read only");
}

#[tokio::test]
async fn get_versions_decodes_version_list() {
    init_tracing();
    let router = Arc::new(CapturingRouter::default());
    let getter = new_getter(router.clone());
    let table = WireTable::default();
    let name = DataName::new(DataTagValue::MutableData, [0x34; 32]);
    let versions = vec![
        DataVersion::new([1; 32], 0),
        DataVersion::new([2; 32], 1),
        DataVersion::new([3; 32], 2),
    ];

    let task = tokio::spawn({
        let getter = getter.clone();
        async move { getter.get_versions(&name).await }
    });

    let sent = wait_for_sends(&router, 1).await;
    let request = Envelope::parse(&sent[0].bytes, &table).expect("parse request");
    assert_eq!(request.action, MessageAction::GetVersionsRequest);

    let serialised = haven_wire::cbor::to_vec(&versions).expect("serialise versions");
    let reply = StructuredDataNameAndContentOrReturnCode::Content(
        DataNameAndContent::new(name, serialised).expect("valid"),
    );
    let bytes = reply_envelope(
        &table,
        MessageAction::GetVersionsResponse,
        Persona::VersionManager,
        Persona::DataGetter,
        request.message_id,
        reply.serialise().expect("serialise"),
    );
    getter.handle_message(&bytes, [0xEE; 32], Receiver::Node([0; 32]));

    let fetched = task.await.expect("join").expect("versions fetched");
    assert_eq!(fetched, versions);
}

#[tokio::test]
async fn get_branch_targets_version_managers() {
    init_tracing();
    let router = Arc::new(CapturingRouter::default());
    let getter = new_getter(router.clone());
    let table = WireTable::default();
    let name = DataName::new(DataTagValue::MutableData, [0x56; 32]);
    let tip = DataVersion::new([9; 32], 7);
    let branch = vec![DataVersion::new([9; 32], 7), DataVersion::new([8; 32], 6)];

    let task = tokio::spawn({
        let getter = getter.clone();
        async move { getter.get_branch(&name, &tip).await }
    });

    let sent = wait_for_sends(&router, 1).await;
    let request = Envelope::parse(&sent[0].bytes, &table).expect("parse request");
    assert_eq!(request.action, MessageAction::GetBranchRequest);
    assert_eq!(request.destination, Persona::VersionManager);

    let serialised = haven_wire::cbor::to_vec(&branch).expect("serialise branch");
    let reply = StructuredDataNameAndContentOrReturnCode::Content(
        DataNameAndContent::new(name, serialised).expect("valid"),
    );
    let bytes = reply_envelope(
        &table,
        MessageAction::GetBranchResponse,
        Persona::VersionManager,
        Persona::DataGetter,
        request.message_id,
        reply.serialise().expect("serialise"),
    );
    getter.handle_message(&bytes, [0xEE; 32], Receiver::Node([0; 32]));

    let fetched = task.await.expect("join").expect("branch fetched");
    assert_eq!(fetched, branch);
}
