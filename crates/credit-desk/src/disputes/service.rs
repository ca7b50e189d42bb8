use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::bureaus::CreditAccount;

use super::collaborator::{CollaboratorError, DraftCollaborator};
use super::comparator::{Comparator, ComparatorConfig, TradelineComparison};
use super::store::{SessionStore, StoreError};
use super::wizard::{
    AnalysisTicket, CollaboratorOutcome, DisputeRound, LetterTicket, SessionId, SessionView,
    WizardError, WizardSession, ANALYSIS_FALLBACK,
};

/// Service composing the session store, the comparator, and the AI
/// collaborator.
///
/// Session mutations are synchronous; the two collaborator calls run through
/// one-shot tickets (`run_analysis`, `run_letter`) that the HTTP layer spawns
/// and tests await directly. Stale-response suppression lives in the session
/// itself: a ticket's generation must still match when its outcome lands.
pub struct DisputeWizardService<S, C> {
    store: Arc<S>,
    collaborator: Arc<C>,
    comparator: Comparator,
    accounts: Vec<CreditAccount>,
    call_timeout: Duration,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("dsp-{id:06}"))
}

impl<S, C> DisputeWizardService<S, C>
where
    S: SessionStore + 'static,
    C: DraftCollaborator + 'static,
{
    pub fn new(
        store: Arc<S>,
        collaborator: Arc<C>,
        accounts: Vec<CreditAccount>,
        comparator_config: ComparatorConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            collaborator,
            comparator: Comparator::new(comparator_config),
            accounts,
            call_timeout,
        }
    }

    pub fn accounts(&self) -> &[CreditAccount] {
        &self.accounts
    }

    pub fn account(&self, account_id: &str) -> Result<&CreditAccount, ServiceError> {
        self.accounts
            .iter()
            .find(|account| account.id == account_id)
            .ok_or_else(|| ServiceError::UnknownAccount(account_id.to_string()))
    }

    /// Comparator report for one tradeline.
    pub fn comparison(&self, account_id: &str) -> Result<TradelineComparison, ServiceError> {
        let account = self.account(account_id)?;
        Ok(self.comparator.assess(account))
    }

    /// Open a wizard session on an account. Entering the analysis step issues
    /// the analysis request; the caller runs the returned ticket.
    pub fn open_session(
        &self,
        account_id: &str,
    ) -> Result<(SessionView, AnalysisTicket), ServiceError> {
        self.account(account_id)?;

        let (session, ticket) = WizardSession::open(next_session_id(), account_id);
        let view = session.view();
        self.store.insert(session)?;
        Ok((view, ticket))
    }

    pub fn session(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        let session = self
            .store
            .fetch(session_id)?
            .ok_or_else(|| ServiceError::UnknownSession(session_id.0.clone()))?;
        Ok(session.view())
    }

    /// Retarget an open session at a different account, invalidating any
    /// in-flight call for the previous one.
    pub fn retarget(
        &self,
        session_id: &SessionId,
        account_id: &str,
    ) -> Result<(SessionView, AnalysisTicket), ServiceError> {
        self.account(account_id)?;
        self.with_session(session_id, |session| Ok(session.retarget(account_id)))
    }

    pub fn proceed(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        self.with_session(session_id, |session| session.proceed().map_err(Into::into))
            .map(|(view, _)| view)
    }

    pub fn back(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        self.with_session(session_id, |session| session.back().map_err(Into::into))
            .map(|(view, _)| view)
    }

    pub fn edit_strategy(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        self.with_session(session_id, |session| {
            session.edit_strategy().map_err(Into::into)
        })
        .map(|(view, _)| view)
    }

    /// Request a letter with the round selected at call time. An explicit
    /// round overrides the stored selection before the ticket is cut.
    pub fn request_letter(
        &self,
        session_id: &SessionId,
        round: Option<DisputeRound>,
    ) -> Result<(SessionView, LetterTicket), ServiceError> {
        self.with_session(session_id, |session| {
            if let Some(round) = round {
                session.select_round(round)?;
            }
            session.request_letter().map_err(Into::into)
        })
    }

    /// Tear down a session. Any in-flight collaborator result for it is
    /// discarded when it arrives.
    pub fn close_session(&self, session_id: &SessionId) -> Result<(), ServiceError> {
        match self.store.remove(session_id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => {
                Err(ServiceError::UnknownSession(session_id.0.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Execute the analysis call authorized by `ticket` and apply the outcome
    /// unless the session was retargeted or closed in the meantime.
    pub async fn run_analysis(&self, ticket: AnalysisTicket) {
        let outcome = match self.account(&ticket.account_id) {
            Ok(account) => self.call_analysis(account).await,
            Err(_) => CollaboratorOutcome::Failed(format!(
                "account '{}' is no longer available",
                ticket.account_id
            )),
        };

        self.apply(
            &ticket.session_id,
            "analysis",
            |session| session.apply_analysis(ticket.generation, outcome),
        );
    }

    /// Execute the letter call authorized by `ticket`; mirrors `run_analysis`.
    pub async fn run_letter(&self, ticket: LetterTicket) {
        let analysis = match self.store.fetch(&ticket.session_id) {
            Ok(Some(session)) => session
                .analysis()
                .map(|outcome| outcome.display_text(ANALYSIS_FALLBACK).to_string())
                .unwrap_or_default(),
            Ok(None) => {
                debug!(session = %ticket.session_id.0, "session closed before letter ran");
                return;
            }
            Err(err) => {
                warn!(error = %err, "session store unavailable; dropping letter ticket");
                return;
            }
        };

        let outcome = match self.account(&ticket.account_id) {
            Ok(account) => self.call_letter(account, &analysis, ticket.round).await,
            Err(_) => CollaboratorOutcome::Failed(format!(
                "account '{}' is no longer available",
                ticket.account_id
            )),
        };

        self.apply(
            &ticket.session_id,
            "letter",
            |session| session.apply_letter(ticket.generation, outcome),
        );
    }

    async fn call_analysis(&self, account: &CreditAccount) -> CollaboratorOutcome {
        match tokio::time::timeout(self.call_timeout, self.collaborator.analyze(account)).await {
            Ok(Ok(text)) => CollaboratorOutcome::Produced(text),
            Ok(Err(err)) => {
                warn!(account = %account.id, error = %err, "analysis call failed");
                CollaboratorOutcome::Failed(err.to_string())
            }
            Err(_) => {
                let err = CollaboratorError::TimedOut(self.call_timeout.as_secs());
                warn!(account = %account.id, error = %err, "analysis call timed out");
                CollaboratorOutcome::Failed(err.to_string())
            }
        }
    }

    async fn call_letter(
        &self,
        account: &CreditAccount,
        analysis: &str,
        round: DisputeRound,
    ) -> CollaboratorOutcome {
        let call = self.collaborator.draft_letter(account, analysis, round);
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(text)) => CollaboratorOutcome::Produced(text),
            Ok(Err(err)) => {
                warn!(account = %account.id, round = round.label(), error = %err, "letter call failed");
                CollaboratorOutcome::Failed(err.to_string())
            }
            Err(_) => {
                let err = CollaboratorError::TimedOut(self.call_timeout.as_secs());
                warn!(account = %account.id, round = round.label(), error = %err, "letter call timed out");
                CollaboratorOutcome::Failed(err.to_string())
            }
        }
    }

    /// Mutate the session under the store lock and return the refreshed view.
    /// The closure runs while the store holds the lock, so a user transition
    /// and a landing collaborator outcome can never interleave between the
    /// read and the write.
    fn with_session<T>(
        &self,
        session_id: &SessionId,
        mutate: impl FnOnce(&mut WizardSession) -> Result<T, ServiceError>,
    ) -> Result<(SessionView, T), ServiceError> {
        self.store
            .mutate(session_id, |session| {
                let value = mutate(session)?;
                Ok((session.view(), value))
            })?
            .ok_or_else(|| ServiceError::UnknownSession(session_id.0.clone()))?
    }

    /// Apply a collaborator outcome to a session if it still wants it. The
    /// generation check runs inside the store lock alongside the write.
    fn apply(
        &self,
        session_id: &SessionId,
        kind: &'static str,
        apply: impl FnOnce(&mut WizardSession) -> bool,
    ) {
        match self.store.mutate(session_id, apply) {
            Ok(Some(true)) => {}
            Ok(Some(false)) => {
                debug!(session = %session_id.0, "dropping stale {kind} outcome");
            }
            Ok(None) => {
                debug!(session = %session_id.0, "session closed; dropping {kind} outcome");
            }
            Err(err) => {
                warn!(session = %session_id.0, error = %err, "session store unavailable; dropping {kind} outcome");
            }
        }
    }
}

/// Error raised by the dispute wizard service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unknown account '{0}'")]
    UnknownAccount(String),
    #[error("unknown session '{0}'")]
    UnknownSession(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
