#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tool3rd_protocol::{Envelope, MemoryUsage, Payload};
use tool3rd_worker::{BuiltinToolkit, MemoryProbe, Outbox, ResourceStore, Worker, WorkerConfig};

pub const ASN1_NAME: &str = "38.331-h00.asn1";
pub const ASN1_NEXT_NAME: &str = "38.331-h10.asn1";
pub const TABULAR_NAME: &str = "38.413-h00.tabular";

pub fn asn1_resource() -> String {
    json!({
        "modulesTag": true,
        "modules": [{
            "name": "NR-RRC-Definitions",
            "assignments": [
                {
                    "name": "RRCSetup",
                    "type": "SEQUENCE",
                    "criticalExtensions": "RRCSetup-IEs"
                },
                {
                    "name": "RRCSetup-IEs",
                    "type": "SEQUENCE",
                    "radioBearerConfig": "INTEGER"
                },
                {
                    "name": "maxDRB",
                    "valueAssignmentTag": true,
                    "value": 29
                }
            ]
        }]
    })
    .to_string()
}

/// Same document with `RRCSetup-IEs` changed and `RRCRelease` added.
pub fn asn1_next_resource() -> String {
    json!({
        "modulesTag": true,
        "modules": [{
            "name": "NR-RRC-Definitions",
            "assignments": [
                {
                    "name": "RRCSetup",
                    "type": "SEQUENCE",
                    "criticalExtensions": "RRCSetup-IEs"
                },
                {
                    "name": "RRCSetup-IEs",
                    "type": "SEQUENCE",
                    "radioBearerConfig": "RadioBearerConfig"
                },
                {
                    "name": "RRCRelease",
                    "type": "SEQUENCE"
                },
                {
                    "name": "maxDRB",
                    "valueAssignmentTag": true,
                    "value": 29
                }
            ]
        }]
    })
    .to_string()
}

/// Two modules, each ending in a value assignment.
pub fn asn1_two_module_resource() -> String {
    json!({
        "modulesTag": true,
        "modules": [
            {
                "name": "NR-RRC-Definitions",
                "assignments": [
                    { "name": "RRCSetup", "type": "SEQUENCE" },
                    { "name": "maxDRB", "valueAssignmentTag": true, "value": 29 }
                ]
            },
            {
                "name": "NR-Sidelink-Preconf",
                "assignments": [
                    { "name": "SL-PreconfigurationNR", "type": "SEQUENCE" },
                    { "name": "SL-Preconfig-Info", "type": "SEQUENCE" },
                    { "name": "maxNrofSL-Dest", "valueAssignmentTag": true, "value": 32 }
                ]
            }
        ]
    })
    .to_string()
}

pub fn tabular_resource() -> String {
    json!({
        "definitionList": [
            {
                "sectionNumber": "9.2.1.1",
                "name": "PDU SESSION RESOURCE SETUP REQUEST",
                "range": "1"
            },
            {
                "sectionNumber": "9.3.1.1",
                "name": "Message Type",
                "presence": "M"
            }
        ]
    })
    .to_string()
}

pub struct FixedProbe;

impl MemoryProbe for FixedProbe {
    fn sample(&self) -> MemoryUsage {
        MemoryUsage {
            total: 16_000,
            used: 4_000,
        }
    }
}

/// A worker with immediate reports plus its outbound port.
pub fn worker() -> (Worker, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = Worker::new(
        WorkerConfig {
            report_debounce: Duration::ZERO,
        },
        ResourceStore::new(),
        Arc::new(BuiltinToolkit),
        Arc::new(FixedProbe),
        Outbox::new(tx),
    );
    (worker, rx)
}

pub fn message(payload: Payload) -> Value {
    Envelope::new(payload).encode().unwrap()
}

pub fn load(name: &str, serialized: String) -> Value {
    message(Payload::ResourceLoadRequest {
        name: name.to_string(),
        serialized,
    })
}

/// Everything the worker sent so far, decoded.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Value>) -> Vec<Payload> {
    let mut out = Vec::new();
    while let Ok(value) = rx.try_recv() {
        out.push(Envelope::decode(&value).unwrap().payload);
    }
    out
}

pub fn channels(payloads: &[Payload]) -> Vec<&'static str> {
    payloads.iter().map(|p| p.channel().as_str()).collect()
}
