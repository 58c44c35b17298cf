//! Onboarding wizard — runs one user through the pages of a decoded
//! configuration.
//!
//! A session is created from a [`PageComponentMap`](crate::codec::PageComponentMap)
//! and a [`PageSequence`]. [`PageSequencer`] renders the current page from the
//! [`FieldRegistry`](crate::fields::FieldRegistry), collects values, and
//! submits through the [`SubmissionGateway`](crate::gateway::SubmissionGateway)
//! when leaving the first and the last page.

pub mod loader;
pub mod sequence;
pub mod sequencer;
pub mod state;

pub use loader::{load_configuration, session_for, start_session};
pub use sequence::PageSequence;
pub use sequencer::{DEFAULT_SUBMIT_TIMEOUT, PageSequencer};
pub use state::{WizardState, WizardStep, field_names};
