use tool3rd_protocol::{Channel, Envelope, MemoryUsage, Payload, WorkerState};

use crate::catalogue;
use crate::{AppState, Effect, Msg, NotificationAction};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![send(Payload::Ping {})],
        Msg::Inbound(envelope) => {
            apply_inbound(&mut state, envelope);
            Vec::new()
        }
        Msg::LoadResource { name, serialized } => {
            gated(&mut state, Payload::ResourceLoadRequest { name, serialized })
        }
        // Sent even though the UI shows busy: that busy is its own download.
        Msg::ResourceFetched { name, serialized } => {
            vec![send(Payload::ResourceLoadRequest { name, serialized })]
        }
        Msg::UnloadResource { id } => gated(&mut state, Payload::ResourceUnloadRequest { id }),
        Msg::CatalogueRequested => vec![Effect::FetchCatalogue],
        Msg::CatalogueLoaded(listing) => {
            state.set_catalogue(listing);
            Vec::new()
        }
        Msg::FetchResource {
            series,
            spec,
            version,
        } => {
            let known = state.catalogue().is_empty()
                || catalogue::contains(state.catalogue(), &series, &spec, &version);
            if !state.can_mutate() || !known {
                return (state, Vec::new());
            }
            // The download runs in the UI context; hold the UI busy until the
            // worker takes over.
            state.set_worker_state(WorkerState::Busy);
            vec![Effect::FetchResource {
                series,
                spec,
                version,
            }]
        }
        Msg::FetchFailed { title, description } => {
            state.set_worker_state(WorkerState::Idle);
            state.notify(title, description, false, None);
            Vec::new()
        }
        Msg::RequestIeList { id } => {
            if !state.can_mutate() {
                return (state, Vec::new());
            }
            state.set_ie_source(id.clone());
            vec![send(Payload::IeListRequest { id })]
        }
        Msg::QueueAdd { key } => {
            state.queue_ie(&key);
            Vec::new()
        }
        Msg::QueueRemove { index } => {
            state.unqueue(index);
            Vec::new()
        }
        Msg::QueueToggleExpand { index } => {
            state.toggle_expand(index);
            Vec::new()
        }
        Msg::QueueClear => {
            state.clear_queue();
            Vec::new()
        }
        Msg::FormatClicked => {
            let queue = state.queue().to_vec();
            gated(&mut state, Payload::FormatRequest { queue })
        }
        Msg::DiffClicked {
            old_resource_id,
            new_resource_id,
        } => gated(
            &mut state,
            Payload::DiffRequest {
                old_resource_id,
                new_resource_id,
            },
        ),
        Msg::OpenFolder { location } => vec![send(Payload::OpenFolderRequest { location })],
        Msg::SettingsRequested => vec![send(Payload::GetSettings {})],
        Msg::SettingsLoaded(settings) => {
            state.set_settings(settings);
            Vec::new()
        }
        Msg::SettingsApplied(settings) => gated(&mut state, Payload::SetSettings { settings }),
        Msg::NotificationDismissed(id) => {
            state.dismiss(id);
            Vec::new()
        }
        Msg::Tick => {
            state.expire_notifications();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn send(payload: Payload) -> Effect {
    Effect::Send(Envelope::new(payload))
}

/// Mutating requests are not sent while the worker is busy.
fn gated(state: &mut AppState, payload: Payload) -> Vec<Effect> {
    if !state.can_mutate() {
        return Vec::new();
    }
    vec![send(payload)]
}

fn apply_inbound(state: &mut AppState, envelope: Envelope) {
    match envelope.payload {
        Payload::WorkerStateReport { state: worker } => state.set_worker_state(worker),
        Payload::ResourceListReport { resource_list } => state.set_resources(resource_list),
        Payload::MemoryUsageReport { total, used } => state.set_memory(MemoryUsage { total, used }),
        Payload::IeListReport { ie_list } => state.set_ie_list(ie_list),
        Payload::FormatReport {
            success,
            save_location,
        } => notify_save(state, Channel::FormatReport, success, save_location),
        Payload::DiffReport {
            success,
            save_location,
        } => notify_save(state, Channel::DiffReport, success, save_location),
        Payload::NotificationReport {
            title,
            description,
            auto_dismiss,
        } => state.notify(title, description, auto_dismiss, None),
        _ => {}
    }
}

fn notify_save(state: &mut AppState, channel: Channel, success: bool, location: Option<String>) {
    let operation = if channel == Channel::DiffReport {
        "Diff"
    } else {
        "Format"
    };
    match (success, location) {
        (true, Some(location)) => state.notify(
            format!("{operation} success"),
            location.clone(),
            false,
            Some(NotificationAction::OpenFolder { location }),
        ),
        (true, None) => state.notify(format!("{operation} success"), "", true, None),
        (false, Some(location)) => state.notify(
            format!("{operation} failed"),
            format!("Save failed to {location}"),
            false,
            None,
        ),
        (false, None) => state.notify(format!("{operation} failed"), "Save is canceled", true, None),
    }
}
