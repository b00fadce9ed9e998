mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tool3rd_protocol::{Envelope, Payload, WorkerState};
use tool3rd_worker::{BuiltinToolkit, WorkerConfig, WorkerHandle};

use common::{asn1_resource, load, message, FixedProbe, ASN1_NAME};

#[tokio::test]
async fn worker_thread_coalesces_list_reports() {
    let config = WorkerConfig {
        report_debounce: Duration::from_millis(100),
    };
    let (handle, mut outbound) =
        WorkerHandle::spawn(config, Arc::new(BuiltinToolkit), Arc::new(FixedProbe)).unwrap();

    handle.post(load(ASN1_NAME, asn1_resource()));
    handle.post(load("38.331-h10.asn1", asn1_resource()));
    handle.post(message(Payload::Ping {}));

    let mut lists = Vec::new();
    let mut last_state = None;
    while let Ok(Some(value)) = timeout(Duration::from_millis(500), outbound.recv()).await {
        match Envelope::decode(&value).unwrap().payload {
            Payload::ResourceListReport { resource_list } => lists.push(resource_list),
            Payload::WorkerStateReport { state } => last_state = Some(state),
            _ => {}
        }
    }

    assert!(!lists.is_empty() && lists.len() < 3);
    assert_eq!(lists.last().map(Vec::len), Some(2));
    assert_eq!(last_state, Some(WorkerState::Idle));

    handle.shutdown();
}
