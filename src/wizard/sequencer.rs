//! Page sequencer — drives a wizard session one page at a time.
//!
//! The sequencer owns a session's [`WizardState`]. Advancing out of the first
//! page registers the user; advancing out of the last page sends the profile
//! update; pages in between advance locally. At most one advance runs at a
//! time, and a failed submission leaves the session on the page it was on with
//! every collected value intact.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::codec::PageComponentMap;
use crate::error::{GatewayError, WizardError};
use crate::fields::{ComponentContract, FieldContract, FieldRegistry};
use crate::gateway::{InFlightFlag, Operation, ProfileUpdate, RegisterRequest, SubmissionGateway};

use super::sequence::PageSequence;
use super::state::{WizardState, WizardStep};

/// Default bound on a single registration or profile-update call.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

enum Submission {
    Register(RegisterRequest),
    UpdateProfile(ProfileUpdate),
}

impl Submission {
    fn operation(&self) -> Operation {
        match self {
            Self::Register(_) => Operation::Register,
            Self::UpdateProfile(_) => Operation::UpdateProfile,
        }
    }
}

/// Finite-state stepper over a decoded configuration.
pub struct PageSequencer {
    pages: PageComponentMap,
    sequence: PageSequence,
    registry: FieldRegistry,
    gateway: Arc<dyn SubmissionGateway>,
    submit_timeout: Duration,
    pending: InFlightFlag,
    state: Mutex<WizardState>,
}

impl PageSequencer {
    /// Session that visits `page1 … pageN` in ordinal order.
    pub fn new(
        pages: PageComponentMap,
        registry: FieldRegistry,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Result<Self, WizardError> {
        let sequence = PageSequence::ordinal(&pages)?;
        Self::with_sequence(pages, sequence, registry, gateway)
    }

    /// Session that visits pages in the given order.
    pub fn with_sequence(
        pages: PageComponentMap,
        sequence: PageSequence,
        registry: FieldRegistry,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Result<Self, WizardError> {
        if let Some(missing) = sequence.iter().find(|p| !pages.contains(p)) {
            return Err(WizardError::UnknownPage {
                page: missing.to_string(),
            });
        }
        debug!(pages = sequence.len(), "Wizard session created");
        Ok(Self {
            pages,
            sequence,
            registry,
            gateway,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            pending: InFlightFlag::new(),
            state: Mutex::new(WizardState::default()),
        })
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of pages in this session.
    pub fn total_pages(&self) -> usize {
        self.sequence.len()
    }

    pub fn sequence(&self) -> &PageSequence {
        &self.sequence
    }

    /// Current step; `Submitting` while a call is in flight.
    pub fn step(&self) -> WizardStep {
        if self.pending.is_busy() {
            return WizardStep::Submitting;
        }
        self.lock().step.clone()
    }

    /// Snapshot of the session state.
    pub fn state(&self) -> WizardState {
        let mut snapshot = self.lock().clone();
        snapshot.submitting = self.pending.is_busy();
        snapshot
    }

    /// Page id being collected, if the session is still collecting.
    pub fn current_page(&self) -> Option<&str> {
        match self.lock().step {
            WizardStep::Collecting(index) => self.sequence.page(index),
            _ => None,
        }
    }

    /// Completion percentage, 0–100.
    pub fn progress(&self) -> u8 {
        let total = self.total_pages();
        match self.lock().step {
            WizardStep::Collecting(index) => ((index * 100) / total).min(100) as u8,
            WizardStep::Completed => 100,
            WizardStep::Submitting | WizardStep::Failed(_) => 0,
        }
    }

    /// Inputs for the current page, in render order.
    pub fn render_page(&self) -> Result<Vec<FieldContract>, WizardError> {
        let index = self.collecting_index()?;
        Ok(self
            .page_contracts(index)?
            .into_iter()
            .flat_map(|contract| contract.fields.iter().cloned())
            .collect())
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.lock().field(name).map(str::to_string)
    }

    /// Record a value for a field.
    pub fn set_field(&self, name: &str, value: &str) -> Result<(), WizardError> {
        let mut state = self.lock();
        if state.step.is_terminal() {
            return Err(WizardError::SessionClosed {
                step: state.step.to_string(),
            });
        }
        state.set_field(name, value);
        Ok(())
    }

    /// End a live session without completing it.
    pub fn abandon(&self, reason: &str) -> Result<(), WizardError> {
        let mut state = self.lock();
        if state.step.is_terminal() {
            return Err(WizardError::SessionClosed {
                step: state.step.to_string(),
            });
        }
        info!(step = %state.step, reason, "Wizard session abandoned");
        state.step = WizardStep::Failed(reason.to_string());
        Ok(())
    }

    /// Validate the current page and move forward, submitting when leaving
    /// the first or the last page. Returns the new step.
    pub async fn advance(&self) -> Result<WizardStep, WizardError> {
        let _pending = self
            .pending
            .try_acquire()
            .ok_or(WizardError::SubmissionPending)?;

        let (index, submission) = {
            let state = self.lock();
            let WizardStep::Collecting(index) = state.step else {
                return Err(WizardError::SessionClosed {
                    step: state.step.to_string(),
                });
            };
            for contract in self.page_contracts(index)? {
                for field in &contract.fields {
                    field.validate(state.field(&field.name))?;
                }
            }

            let submission = if index == 1 {
                Some(Submission::Register(state.registration_request()))
            } else if index == self.total_pages() {
                Some(Submission::UpdateProfile(state.profile_update()))
            } else {
                None
            };
            (index, submission)
        };

        let next = WizardStep::after(index, self.total_pages());

        let Some(submission) = submission else {
            self.lock().step = next.clone();
            debug!(from = index, to = %next, "Wizard advanced");
            return Ok(next);
        };

        let operation = submission.operation();
        debug!(page = index, %operation, "Submitting wizard page");

        match self.submit(submission).await {
            Ok(()) => {
                self.lock().step = next.clone();
                info!(from = index, to = %next, %operation, "Wizard submission succeeded");
                Ok(next)
            }
            Err(e) => {
                warn!(page = index, %operation, error = %e, "Wizard submission failed");
                Err(e)
            }
        }
    }

    async fn submit(&self, submission: Submission) -> Result<(), WizardError> {
        let operation = submission.operation();
        let call = async {
            match &submission {
                Submission::Register(request) => {
                    let response = self.gateway.register(request).await?;
                    self.lock().merge_registration(&response);
                }
                Submission::UpdateProfile(request) => {
                    self.gateway.update_profile(request).await?;
                }
            }
            Ok::<(), GatewayError>(())
        };

        tokio::time::timeout(self.submit_timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout {
                operation: operation.to_string(),
                timeout: self.submit_timeout,
            })??;
        Ok(())
    }

    fn collecting_index(&self) -> Result<usize, WizardError> {
        let state = self.lock();
        match state.step {
            WizardStep::Collecting(index) => Ok(index),
            ref other => Err(WizardError::SessionClosed {
                step: other.to_string(),
            }),
        }
    }

    fn page_contracts(&self, index: usize) -> Result<Vec<&ComponentContract>, WizardError> {
        let page = self
            .sequence
            .page(index)
            .ok_or_else(|| WizardError::UnknownPage {
                page: format!("#{index}"),
            })?;
        let components = self
            .pages
            .components(page)
            .ok_or_else(|| WizardError::UnknownPage {
                page: page.to_string(),
            })?;
        self.registry.resolve_page(page, components)
    }
}
