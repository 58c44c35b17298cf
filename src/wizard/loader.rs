//! Session bootstrap: fetch the saved configuration and open a sequencer on it.

use std::sync::Arc;

use tracing::info;

use crate::codec::{self, DecodedConfiguration};
use crate::config::PageOrder;
use crate::error::WizardError;
use crate::fields::FieldRegistry;
use crate::gateway::SubmissionGateway;

use super::sequence::PageSequence;
use super::sequencer::PageSequencer;

/// Fetch the current configuration from the backend and decode it.
pub async fn load_configuration(
    gateway: &dyn SubmissionGateway,
) -> Result<DecodedConfiguration, WizardError> {
    let raw = gateway.fetch_config().await?;
    let decoded = codec::decode_json(raw)?;
    info!(
        name = %decoded.name,
        pages = decoded.pages.len(),
        "Loaded onboarding configuration"
    );
    Ok(decoded)
}

/// Open a session on an already decoded configuration.
pub fn session_for(
    decoded: DecodedConfiguration,
    order: PageOrder,
    registry: FieldRegistry,
    gateway: Arc<dyn SubmissionGateway>,
) -> Result<PageSequencer, WizardError> {
    let sequence = PageSequence::for_order(order, &decoded)?;
    PageSequencer::with_sequence(decoded.pages, sequence, registry, gateway)
}

/// Fetch, decode, and open a session in one step.
pub async fn start_session(
    gateway: Arc<dyn SubmissionGateway>,
    registry: FieldRegistry,
    order: PageOrder,
) -> Result<PageSequencer, WizardError> {
    let decoded = load_configuration(gateway.as_ref()).await?;
    session_for(decoded, order, registry, gateway)
}
