use tool3rd_protocol::Envelope;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Hand an envelope to the orchestrator relay.
    Send(Envelope),
    /// Download the remote catalogue listing.
    FetchCatalogue,
    /// Download one resource from the remote catalogue.
    FetchResource {
        series: String,
        spec: String,
        version: String,
    },
}
