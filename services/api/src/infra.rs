use async_trait::async_trait;
use credit_desk::bureaus::CreditAccount;
use credit_desk::disputes::collaborator::{CollaboratorError, DraftCollaborator};
use credit_desk::disputes::store::{SessionStore, StoreError};
use credit_desk::disputes::wizard::{DisputeRound, SessionId, WizardSession};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session storage. Sessions are owned copies; the wizard
/// service serializes fetch/update per session.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, WizardSession>>>,
}

impl InMemorySessionStore {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<SessionId, WizardSession>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: WizardSession) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        if guard.contains_key(session.id()) {
            return Err(StoreError::Conflict);
        }
        guard.insert(session.id().clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<WizardSession>, StoreError> {
        let guard = self.guard()?;
        Ok(guard.get(id).cloned())
    }

    fn mutate<T>(
        &self,
        id: &SessionId,
        apply: impl FnOnce(&mut WizardSession) -> T,
    ) -> Result<Option<T>, StoreError> {
        let mut guard = self.guard()?;
        Ok(guard.get_mut(id).map(apply))
    }

    fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        if guard.remove(id).is_some() {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

/// Offline stand-in for the Gemini collaborator, used by the CLI demo so it
/// runs without credentials or network access.
#[derive(Default, Clone)]
pub(crate) struct ScriptedCollaborator;

#[async_trait]
impl DraftCollaborator for ScriptedCollaborator {
    async fn analyze(&self, account: &CreditAccount) -> Result<String, CollaboratorError> {
        Ok(format!(
            "Scripted analysis for {}: compare the balance, account status, and \
             reported dates across the {} bureau(s) on file and flag any that \
             disagree with the majority.",
            account.creditor_name,
            account.records.len()
        ))
    }

    async fn draft_letter(
        &self,
        account: &CreditAccount,
        analysis: &str,
        round: DisputeRound,
    ) -> Result<String, CollaboratorError> {
        Ok(format!(
            "[My Name]\n[My Address]\n[Date]\n\nRe: {} ({})\n\nScripted {} letter.\n\nFindings under dispute:\n{}\n\nSincerely,\n[My Name]",
            account.creditor_name,
            account.id,
            round.label(),
            analysis
        ))
    }
}
