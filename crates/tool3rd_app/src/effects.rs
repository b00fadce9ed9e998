use std::sync::Arc;

use context_logging::{ctx_debug, ctx_error, ctx_info, ctx_warn};
use tokio::sync::{mpsc, oneshot};
use tool3rd_core::{Effect, Msg};
use tool3rd_protocol::{Channel, Envelope, ProcessId, Settings};

use crate::catalogue::CatalogueSource;
use crate::relay::Invocation;

/// Executes effects for the UI context. Results come back as messages.
pub struct EffectRunner {
    invoke_tx: mpsc::UnboundedSender<Invocation>,
    msg_tx: mpsc::UnboundedSender<Msg>,
    catalogue: Arc<dyn CatalogueSource>,
}

impl EffectRunner {
    pub fn new(
        invoke_tx: mpsc::UnboundedSender<Invocation>,
        msg_tx: mpsc::UnboundedSender<Msg>,
        catalogue: Arc<dyn CatalogueSource>,
    ) -> Self {
        Self {
            invoke_tx,
            msg_tx,
            catalogue,
        }
    }

    /// Must be called from within the UI context's runtime.
    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(envelope) => self.send(envelope),
                Effect::FetchCatalogue => {
                    let catalogue = self.catalogue.clone();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let msg = match catalogue.listing().await {
                            Ok(listing) => {
                                ctx_info!("catalogue lists {} series", listing.len());
                                Msg::CatalogueLoaded(listing)
                            }
                            Err(err) => {
                                ctx_warn!("catalogue download failed: {}", err);
                                fetch_failed(&err)
                            }
                        };
                        let _ = msg_tx.send(msg);
                    });
                }
                Effect::FetchResource {
                    series,
                    spec,
                    version,
                } => {
                    let catalogue = self.catalogue.clone();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let msg = match catalogue.resource(&series, &spec, &version).await {
                            Ok(serialized) => {
                                ctx_info!("downloaded {} ({} bytes)", version, serialized.len());
                                Msg::ResourceFetched {
                                    name: version,
                                    serialized,
                                }
                            }
                            Err(err) => {
                                ctx_warn!("download of {} failed: {}", version, err);
                                fetch_failed(&err)
                            }
                        };
                        let _ = msg_tx.send(msg);
                    });
                }
            }
        }
    }

    fn send(&self, envelope: Envelope) {
        let channel = envelope.channel();
        let expects_reply = envelope.dest == ProcessId::Main;
        let message = match envelope.encode() {
            Ok(message) => message,
            Err(err) => {
                ctx_error!("failed to encode {}: {}", channel, err);
                return;
            }
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .invoke_tx
            .send(Invocation {
                message,
                reply: reply_tx,
            })
            .is_err()
        {
            ctx_debug!("orchestrator port closed, dropping {}", channel);
            return;
        }
        if !expects_reply {
            return;
        }

        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let Ok(Some(reply)) = reply_rx.await else {
                return;
            };
            if channel == Channel::GetSettings {
                match serde_json::from_value::<Settings>(reply) {
                    Ok(settings) => {
                        let _ = msg_tx.send(Msg::SettingsLoaded(settings));
                    }
                    Err(err) => ctx_warn!("unexpected settings reply: {}", err),
                }
            }
        });
    }
}

fn fetch_failed(err: &crate::catalogue::CatalogueError) -> Msg {
    let (title, description) = err.notification();
    Msg::FetchFailed { title, description }
}
