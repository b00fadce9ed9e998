use pretty_assertions::assert_eq;
use serde_json::json;
use tool3rd_protocol::{
    ArtifactKind, Channel, Envelope, EnvelopeHeader, Payload, ProcessId, ProtocolError,
    ResourceType, Settings, WorkerState,
};

#[test]
fn decodes_load_request_from_renderer() {
    let msg = json!({
        "src": "renderer",
        "dest": "worker",
        "channel": "resourceLoadRequest",
        "name": "38.331-h00.asn1",
        "serialized": "{}"
    });

    let envelope = Envelope::decode(&msg).expect("valid envelope");
    assert_eq!(envelope.src, ProcessId::Renderer);
    assert_eq!(envelope.dest, ProcessId::Worker);
    assert_eq!(
        envelope.payload,
        Payload::ResourceLoadRequest {
            name: "38.331-h00.asn1".to_string(),
            serialized: "{}".to_string(),
        }
    );
}

#[test]
fn channel_literal_decides_between_identical_payload_shapes() {
    let unload = json!({"src": "renderer", "dest": "worker", "channel": "resourceUnloadRequest", "id": "3"});
    let ie_list = json!({"src": "renderer", "dest": "worker", "channel": "ieListRequest", "id": "3"});

    assert_eq!(
        Envelope::decode(&unload).unwrap().payload,
        Payload::ResourceUnloadRequest { id: "3".to_string() }
    );
    assert_eq!(
        Envelope::decode(&ie_list).unwrap().payload,
        Payload::IeListRequest { id: "3".to_string() }
    );
}

#[test]
fn unknown_channel_and_missing_fields_are_malformed() {
    let unknown = json!({"src": "renderer", "dest": "worker", "channel": "reboot"});
    let missing = json!({"src": "renderer", "dest": "worker", "channel": "resourceLoadRequest", "name": "x"});
    let wrong_type = json!({"src": "renderer", "dest": "worker", "channel": "formatRequest", "queue": "all"});
    let not_an_object = json!("ping");

    for msg in [unknown, missing, wrong_type, not_an_object] {
        assert!(matches!(
            Envelope::decode(&msg),
            Err(ProtocolError::Malformed(_))
        ));
    }
}

#[test]
fn route_mismatch_is_rejected() {
    let msg = json!({"src": "worker", "dest": "worker", "channel": "ping"});
    let err = Envelope::decode(&msg).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Misrouted {
            channel: Channel::Ping,
            src: ProcessId::Worker,
            dest: ProcessId::Worker,
        }
    ));
}

#[test]
fn optional_save_location_is_omitted_on_the_wire() {
    let cancelled = Envelope::new(Payload::FormatReport {
        success: false,
        save_location: None,
    });
    let value = cancelled.encode().unwrap();
    assert_eq!(
        value,
        json!({"src": "worker", "dest": "renderer", "channel": "formatReport", "success": false})
    );

    let response = json!({"src": "main", "dest": "worker", "channel": "saveLocationResponse"});
    assert_eq!(
        Envelope::decode(&response).unwrap().payload,
        Payload::SaveLocationResponse {
            save_location: None
        }
    );
}

#[test]
fn reports_use_camel_case_fields() {
    let report = Envelope::new(Payload::ResourceListReport {
        resource_list: vec![tool3rd_protocol::ResourceMetadata {
            id: "0".to_string(),
            name: "38.331-h00.asn1".to_string(),
            resource_type: ResourceType::Asn1,
        }],
    });
    assert_eq!(
        report.encode().unwrap(),
        json!({
            "src": "worker",
            "dest": "renderer",
            "channel": "resourceListReport",
            "resourceList": [{"id": "0", "name": "38.331-h00.asn1", "type": "asn1"}]
        })
    );

    let state = Envelope::new(Payload::WorkerStateReport {
        state: WorkerState::Busy,
    });
    assert_eq!(state.encode().unwrap()["state"], json!("busy"));

    let save = Envelope::new(Payload::SaveLocationRequest {
        artifact: Some(ArtifactKind::DiffReport),
    });
    assert_eq!(save.encode().unwrap()["artifact"], json!("diffReport"));
}

#[test]
fn every_channel_name_round_trips_through_its_literal() {
    for channel in Channel::ALL {
        assert_eq!(Channel::from_name(channel.as_str()), Some(channel));
    }
    assert_eq!(Channel::from_name("Ping"), None);
}

#[test]
fn envelope_new_follows_channel_route() {
    let request = Envelope::new(Payload::SaveLocationRequest { artifact: None });
    assert_eq!((request.src, request.dest), (ProcessId::Worker, ProcessId::Main));

    let open = Envelope::from(Payload::OpenFolderRequest {
        location: "/tmp/out.xlsx".to_string(),
    });
    assert_eq!((open.src, open.dest), (ProcessId::Renderer, ProcessId::Main));
}

#[test]
fn header_decodes_unknown_channels_for_routing() {
    let msg = json!({"src": "renderer", "dest": "worker", "channel": "somethingNew", "x": 1});
    let header = EnvelopeHeader::decode(&msg).unwrap();
    assert_eq!(header.dest, ProcessId::Worker);
    assert_eq!(header.known_channel(), None);

    let bad_dest = json!({"src": "renderer", "dest": "gpu", "channel": "ping"});
    assert!(EnvelopeHeader::decode(&bad_dest).is_err());
}

#[test]
fn settings_fill_defaults_for_optional_flags() {
    let msg = json!({
        "src": "renderer",
        "dest": "main",
        "channel": "setSettings",
        "settings": {
            "proxy": {"protocol": "https", "host": "proxy.local", "port": 8443},
            "certificate": {"path": ""}
        }
    });
    let Payload::SetSettings { settings } = Envelope::decode(&msg).unwrap().payload else {
        panic!("expected setSettings");
    };
    assert!(!settings.proxy.enabled);
    assert!(!settings.certificate.enabled);
    assert!(settings.verify_certificate);
    assert_eq!(settings.proxy.url(), None);

    let mut enabled = settings.clone();
    enabled.proxy.enabled = true;
    assert_eq!(enabled.proxy.url().as_deref(), Some("https://proxy.local:8443"));
}

#[test]
fn default_settings_serialize_to_initial_file_layout() {
    assert_eq!(
        serde_json::to_value(Settings::default()).unwrap(),
        json!({
            "proxy": {"use": false, "protocol": "http", "host": "", "port": 0},
            "certificate": {"use": false, "path": ""},
            "verifyCertificate": true
        })
    );
}

#[test]
fn out_of_range_port_is_rejected() {
    let msg = json!({
        "src": "renderer",
        "dest": "main",
        "channel": "setSettings",
        "settings": {
            "proxy": {"use": true, "protocol": "http", "host": "h", "port": 70000},
            "certificate": {"use": false, "path": ""},
            "verifyCertificate": true
        }
    });
    assert!(Envelope::decode(&msg).is_err());
}
