use context_logging::{ctx_debug, ctx_error};
use serde_json::Value;
use tokio::sync::mpsc;
use tool3rd_protocol::{Envelope, Payload};

/// Outbound port of the worker. Every payload leaves wrapped in an envelope
/// whose `src`/`dest` come from the channel's route.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Value>,
}

impl Outbox {
    pub fn new(tx: mpsc::UnboundedSender<Value>) -> Self {
        Self { tx }
    }

    pub fn post(&self, payload: Payload) {
        let envelope = Envelope::new(payload);
        let channel = envelope.channel();
        match envelope.encode() {
            Ok(value) => {
                if self.tx.send(value).is_err() {
                    ctx_debug!("outbound port closed, dropping {}", channel);
                }
            }
            Err(err) => ctx_error!("failed to encode {}: {}", channel, err),
        }
    }
}
