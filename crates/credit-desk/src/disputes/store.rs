use super::wizard::{SessionId, WizardSession};

/// Storage abstraction so the wizard service can be exercised in isolation.
/// Sessions are not persisted across process restarts; implementations are
/// expected to be in-memory maps.
///
/// `mutate` is the only write path for existing sessions and must run the
/// closure while holding the store's lock for that session: user transitions
/// and late collaborator outcomes race each other, and the generation check
/// inside the closure is only sound if no other writer can slip between the
/// read and the write.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: WizardSession) -> Result<(), StoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<WizardSession>, StoreError>;
    /// Run `apply` against the stored session under the store lock. Returns
    /// `Ok(None)` when the session does not exist.
    fn mutate<T>(
        &self,
        id: &SessionId,
        apply: impl FnOnce(&mut WizardSession) -> T,
    ) -> Result<Option<T>, StoreError>;
    fn remove(&self, id: &SessionId) -> Result<(), StoreError>;
}

/// Error enumeration for session store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
