//! Dispute drafting workflow: comparator, wizard state machine, prompt
//! construction, the AI collaborator seam, and the HTTP surface over them.

pub mod collaborator;
pub mod comparator;
pub mod prompt;
pub mod router;
pub mod service;
pub mod store;
pub mod wizard;

pub use collaborator::{Collaborator, CollaboratorError, DraftCollaborator};
pub use comparator::{
    Comparator, ComparatorConfig, ComparedField, CrossBureauState, FieldComparison,
    TradelineComparison,
};
pub use router::dispute_router;
pub use service::{DisputeWizardService, ServiceError};
pub use store::{SessionStore, StoreError};
pub use wizard::{
    AnalysisTicket, CollaboratorOutcome, DisputeRound, LetterTicket, SessionId, SessionView,
    WizardError, WizardSession, WizardStep, ANALYSIS_FALLBACK, LETTER_FALLBACK,
};
