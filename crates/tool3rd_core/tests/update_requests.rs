use std::sync::Once;

use pretty_assertions::assert_eq;
use tool3rd_core::{update, AppState, CatalogueSeries, CatalogueSpec, Effect, Msg};
use tool3rd_protocol::{Envelope, IeEntry, Payload, ProcessId, QueueItem, WorkerState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(context_logging::initialize_for_tests);
}

fn inbound(state: AppState, payload: Payload) -> AppState {
    update(state, Msg::Inbound(Envelope::new(payload))).0
}

fn idle_state() -> AppState {
    inbound(
        AppState::new(),
        Payload::WorkerStateReport {
            state: WorkerState::Idle,
        },
    )
}

fn sent(effects: &[Effect]) -> Vec<&Payload> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Send(envelope) => Some(&envelope.payload),
            _ => None,
        })
        .collect()
}

#[test]
fn starts_busy_and_pings_the_worker() {
    init_logging();
    let state = AppState::new();
    assert!(!state.view().can_mutate);

    let (_state, effects) = update(state, Msg::Started);
    let Effect::Send(envelope) = &effects[0] else {
        panic!("expected a send");
    };
    assert_eq!(envelope.src, ProcessId::Renderer);
    assert_eq!(envelope.dest, ProcessId::Worker);
    assert_eq!(envelope.payload, Payload::Ping {});
}

#[test]
fn mutating_requests_wait_for_idle() {
    init_logging();
    let load = || Msg::LoadResource {
        name: "38.331-h00.asn1".to_string(),
        serialized: "{}".to_string(),
    };

    let (state, effects) = update(AppState::new(), load());
    assert!(effects.is_empty());

    let state = inbound(
        state,
        Payload::WorkerStateReport {
            state: WorkerState::Idle,
        },
    );
    let (_state, effects) = update(state, load());
    assert_eq!(
        sent(&effects),
        vec![&Payload::ResourceLoadRequest {
            name: "38.331-h00.asn1".to_string(),
            serialized: "{}".to_string(),
        }]
    );
}

#[test]
fn non_mutating_requests_are_sent_while_busy() {
    init_logging();
    let (_state, effects) = update(
        AppState::new(),
        Msg::OpenFolder {
            location: "/tmp/out.xlsx".to_string(),
        },
    );
    assert_eq!(effects.len(), 1);

    let (_state, effects) = update(AppState::new(), Msg::SettingsRequested);
    assert_eq!(sent(&effects), vec![&Payload::GetSettings {}]);
}

#[test]
fn queue_is_built_from_the_shown_ie_list() {
    init_logging();
    let (state, effects) = update(idle_state(), Msg::RequestIeList { id: "0".to_string() });
    assert_eq!(sent(&effects), vec![&Payload::IeListRequest { id: "0".to_string() }]);

    let state = inbound(
        state,
        Payload::IeListReport {
            ie_list: vec![IeEntry {
                name: "RRCSetup".to_string(),
                key: "NR-RRC-Definitions.RRCSetup".to_string(),
            }],
        },
    );
    let add = || Msg::QueueAdd {
        key: "NR-RRC-Definitions.RRCSetup".to_string(),
    };
    let (state, _) = update(state, add());
    let (state, _) = update(state, add());
    let (state, _) = update(state, Msg::QueueAdd { key: "missing".to_string() });
    let (state, _) = update(state, Msg::QueueToggleExpand { index: 0 });

    assert_eq!(
        state.queue(),
        &[QueueItem {
            id: "0".to_string(),
            name: "RRCSetup".to_string(),
            key: "NR-RRC-Definitions.RRCSetup".to_string(),
            expand: true,
        }]
    );

    let (state, effects) = update(state, Msg::FormatClicked);
    assert_eq!(
        sent(&effects),
        vec![&Payload::FormatRequest {
            queue: state.queue().to_vec()
        }]
    );

    let (state, _) = update(state, Msg::QueueRemove { index: 5 });
    assert_eq!(state.queue().len(), 1);
    let (state, _) = update(state, Msg::QueueClear);
    assert!(state.queue().is_empty());
}

#[test]
fn empty_queue_can_still_be_formatted() {
    init_logging();
    let (_state, effects) = update(idle_state(), Msg::FormatClicked);
    assert_eq!(sent(&effects), vec![&Payload::FormatRequest { queue: Vec::new() }]);
}

#[test]
fn catalogue_fetch_holds_busy_until_the_worker_reports() {
    init_logging();
    let (state, effects) = update(idle_state(), Msg::CatalogueRequested);
    assert_eq!(effects, vec![Effect::FetchCatalogue]);

    let listing = vec![CatalogueSeries {
        name: "38_series".to_string(),
        children: vec![CatalogueSpec {
            name: "38.331".to_string(),
            children: vec!["38.331-h00.asn1".to_string()],
        }],
    }];
    let (state, _) = update(state, Msg::CatalogueLoaded(listing));

    let (state, effects) = update(
        state,
        Msg::FetchResource {
            series: "38_series".to_string(),
            spec: "38.331".to_string(),
            version: "38.331-zzz.asn1".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::FetchResource {
            series: "38_series".to_string(),
            spec: "38.331".to_string(),
            version: "38.331-h00.asn1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchResource {
            series: "38_series".to_string(),
            spec: "38.331".to_string(),
            version: "38.331-h00.asn1".to_string(),
        }]
    );
    assert_eq!(state.worker_state(), WorkerState::Busy);

    let (state, effects) = update(
        state,
        Msg::ResourceFetched {
            name: "38.331-h00.asn1".to_string(),
            serialized: "{}".to_string(),
        },
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(state.worker_state(), WorkerState::Busy);
}

#[test]
fn failed_fetch_notifies_and_releases_the_ui() {
    init_logging();
    let (state, _) = update(
        idle_state(),
        Msg::FetchResource {
            series: "38_series".to_string(),
            spec: "38.331".to_string(),
            version: "38.331-h00.asn1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FetchFailed {
            title: "Download failed".to_string(),
            description: "connection reset".to_string(),
        },
    );

    assert!(state.can_mutate());
    let notification = &state.notifications()[0];
    assert_eq!(notification.title, "Download failed");
    assert!(!notification.auto_dismiss);
}
