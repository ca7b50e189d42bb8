//! Dispute wizard state machine.
//!
//! Three steps, no terminal state: `Analysis` runs an automatic AI analysis
//! of the selected tradeline, `Strategy` picks a dispute round, and `Preview`
//! holds the drafted letter. Collaborator calls are asynchronous; every call
//! is tagged with the session's generation counter so a response that arrives
//! after the session moved to a different account is dropped instead of
//! overwriting fresher state.

use serde::{Deserialize, Serialize};

/// Fallback prose shown when the analysis call fails.
pub const ANALYSIS_FALLBACK: &str =
    "Unable to perform AI analysis at this time. Please check your connection.";

/// Fallback prose shown when the letter call fails.
pub const LETTER_FALLBACK: &str = "Unable to generate letter at this time.";

/// Identifier wrapper for wizard sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Current step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    Analysis,
    Strategy,
    Preview,
}

impl WizardStep {
    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Analysis => "analysis",
            WizardStep::Strategy => "strategy",
            WizardStep::Preview => "preview",
        }
    }
}

/// Exclusive choice between the two letter strategies. The identifier is
/// opaque to everything except prompt template selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeRound {
    #[default]
    #[serde(rename = "ROUND_1_CREDITOR")]
    Round1Creditor,
    #[serde(rename = "ROUND_2_BUREAU")]
    Round2Bureau,
}

impl DisputeRound {
    pub const fn label(self) -> &'static str {
        match self {
            DisputeRound::Round1Creditor => "ROUND_1_CREDITOR",
            DisputeRound::Round2Bureau => "ROUND_2_BUREAU",
        }
    }
}

/// Discriminated result of a collaborator call.
///
/// The original product rendered failure prose inline as if it were content;
/// the session keeps the distinction internally and only the rendered view
/// collapses `Failed` into the fallback string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollaboratorOutcome {
    Produced(String),
    Failed(String),
}

impl CollaboratorOutcome {
    pub fn display_text<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            CollaboratorOutcome::Produced(text) => text,
            CollaboratorOutcome::Failed(_) => fallback,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CollaboratorOutcome::Failed(_))
    }
}

/// One-shot handle authorizing a single analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub session_id: SessionId,
    pub account_id: String,
    pub generation: u64,
}

/// One-shot handle authorizing a single letter-generation call. Captures the
/// round chosen at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterTicket {
    pub session_id: SessionId,
    pub account_id: String,
    pub generation: u64,
    pub round: DisputeRound,
}

/// Transition errors surfaced to callers as conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("analysis is still in flight")]
    AnalysisPending,
    #[error("no analysis result is available yet")]
    AnalysisMissing,
    #[error("a letter is already being generated")]
    LetterPending,
    #[error("cannot {action} from the {step} step", step = .from.label())]
    InvalidTransition {
        from: WizardStep,
        action: &'static str,
    },
}

/// A single user's dispute wizard session. Single-owner, never shared across
/// concurrent mutators; the store hands out owned copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    id: SessionId,
    account_id: String,
    step: WizardStep,
    generation: u64,
    round: DisputeRound,
    analysis: Option<CollaboratorOutcome>,
    analysis_pending: bool,
    letter: Option<CollaboratorOutcome>,
    letter_pending: bool,
}

impl WizardSession {
    /// Open a session on an account. Entering `Analysis` issues exactly one
    /// analysis request as a side effect; the returned ticket carries it.
    pub fn open(id: SessionId, account_id: impl Into<String>) -> (Self, AnalysisTicket) {
        let account_id = account_id.into();
        let session = Self {
            id: id.clone(),
            account_id: account_id.clone(),
            step: WizardStep::Analysis,
            generation: 1,
            round: DisputeRound::default(),
            analysis: None,
            analysis_pending: true,
            letter: None,
            letter_pending: false,
        };
        let ticket = AnalysisTicket {
            session_id: id,
            account_id,
            generation: 1,
        };
        (session, ticket)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn round(&self) -> DisputeRound {
        self.round
    }

    pub fn analysis(&self) -> Option<&CollaboratorOutcome> {
        self.analysis.as_ref()
    }

    pub fn letter(&self) -> Option<&CollaboratorOutcome> {
        self.letter.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.analysis_pending || self.letter_pending
    }

    /// Point the session at a different account. Resets to a fresh `Analysis`
    /// step and bumps the generation so any in-flight response for the old
    /// account becomes stale.
    pub fn retarget(&mut self, account_id: impl Into<String>) -> AnalysisTicket {
        self.account_id = account_id.into();
        self.step = WizardStep::Analysis;
        self.generation += 1;
        self.round = DisputeRound::default();
        self.analysis = None;
        self.analysis_pending = true;
        self.letter = None;
        self.letter_pending = false;

        AnalysisTicket {
            session_id: self.id.clone(),
            account_id: self.account_id.clone(),
            generation: self.generation,
        }
    }

    /// Apply an analysis outcome. Returns `false` (and writes nothing) when
    /// the outcome belongs to a superseded generation.
    pub fn apply_analysis(&mut self, generation: u64, outcome: CollaboratorOutcome) -> bool {
        if generation != self.generation {
            return false;
        }
        self.analysis = Some(outcome);
        self.analysis_pending = false;
        true
    }

    /// `Analysis -> Strategy`, available only once the analysis resolved.
    pub fn proceed(&mut self) -> Result<(), WizardError> {
        if self.step != WizardStep::Analysis {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "proceed to strategy",
            });
        }
        if self.analysis_pending {
            return Err(WizardError::AnalysisPending);
        }
        if self.analysis.is_none() {
            return Err(WizardError::AnalysisMissing);
        }
        self.step = WizardStep::Strategy;
        Ok(())
    }

    /// `Strategy -> Analysis`. Keeps the analysis text, re-invokes nothing.
    pub fn back(&mut self) -> Result<(), WizardError> {
        if self.step != WizardStep::Strategy {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "go back to analysis",
            });
        }
        self.step = WizardStep::Analysis;
        Ok(())
    }

    /// Pick the letter strategy; only meaningful on the `Strategy` step.
    pub fn select_round(&mut self, round: DisputeRound) -> Result<(), WizardError> {
        if self.step != WizardStep::Strategy {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "select a round",
            });
        }
        self.round = round;
        Ok(())
    }

    /// Request letter generation with the round selected at call time. The
    /// session stays on `Strategy` with generation blocked until the outcome
    /// is applied.
    pub fn request_letter(&mut self) -> Result<LetterTicket, WizardError> {
        if self.step != WizardStep::Strategy {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "generate a letter",
            });
        }
        if self.letter_pending {
            return Err(WizardError::LetterPending);
        }
        if self.analysis.is_none() {
            return Err(WizardError::AnalysisMissing);
        }
        self.letter_pending = true;

        Ok(LetterTicket {
            session_id: self.id.clone(),
            account_id: self.account_id.clone(),
            generation: self.generation,
            round: self.round,
        })
    }

    /// Apply a letter outcome and advance to `Preview`. Stale generations and
    /// responses arriving with no request outstanding are dropped.
    pub fn apply_letter(&mut self, generation: u64, outcome: CollaboratorOutcome) -> bool {
        if generation != self.generation || !self.letter_pending {
            return false;
        }
        self.letter = Some(outcome);
        self.letter_pending = false;
        self.step = WizardStep::Preview;
        true
    }

    /// `Preview -> Strategy`. The drafted letter is retained; the next
    /// generate call overwrites it.
    pub fn edit_strategy(&mut self) -> Result<(), WizardError> {
        if self.step != WizardStep::Preview {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                action: "edit the strategy",
            });
        }
        self.step = WizardStep::Strategy;
        Ok(())
    }

    /// Sanitized representation for API responses. Failure outcomes render as
    /// the fallback prose the original product showed inline.
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            account_id: self.account_id.clone(),
            step: self.step.label(),
            loading: self.is_loading(),
            round: self.round.label(),
            analysis: self
                .analysis
                .as_ref()
                .map(|outcome| outcome.display_text(ANALYSIS_FALLBACK).to_string()),
            letter: self
                .letter
                .as_ref()
                .map(|outcome| outcome.display_text(LETTER_FALLBACK).to_string()),
        }
    }
}

/// Serialized session state for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub account_id: String,
    pub step: &'static str,
    pub loading: bool,
    pub round: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (WizardSession, AnalysisTicket) {
        WizardSession::open(SessionId("dsp-000001".to_string()), "acct_123")
    }

    fn produced(text: &str) -> CollaboratorOutcome {
        CollaboratorOutcome::Produced(text.to_string())
    }

    #[test]
    fn opens_in_analysis_and_loading() {
        let (session, ticket) = open();
        assert_eq!(session.step(), WizardStep::Analysis);
        assert!(session.is_loading());
        assert_eq!(ticket.generation, 1);
        assert_eq!(ticket.account_id, "acct_123");
    }

    #[test]
    fn proceed_is_blocked_until_analysis_resolves() {
        let (mut session, ticket) = open();
        assert_eq!(session.proceed(), Err(WizardError::AnalysisPending));

        assert!(session.apply_analysis(ticket.generation, produced("two mismatches")));
        assert!(!session.is_loading());
        session.proceed().expect("analysis resolved");
        assert_eq!(session.step(), WizardStep::Strategy);
    }

    #[test]
    fn stale_analysis_is_dropped_after_retarget() {
        let (mut session, first) = open();
        let second = session.retarget("acct_456");

        assert!(!session.apply_analysis(first.generation, produced("stale chase analysis")));
        assert!(session.analysis().is_none());
        assert!(session.is_loading());

        assert!(session.apply_analysis(second.generation, produced("midland analysis")));
        assert_eq!(
            session.analysis(),
            Some(&produced("midland analysis"))
        );
    }

    #[test]
    fn back_retains_analysis_without_reissuing() {
        let (mut session, ticket) = open();
        session.apply_analysis(ticket.generation, produced("analysis"));
        session.proceed().expect("to strategy");
        session.back().expect("back to analysis");

        assert_eq!(session.step(), WizardStep::Analysis);
        assert_eq!(session.analysis(), Some(&produced("analysis")));
        assert!(!session.is_loading(), "no new call was issued");
    }

    #[test]
    fn letter_ticket_captures_round_at_call_time() {
        let (mut session, ticket) = open();
        session.apply_analysis(ticket.generation, produced("analysis"));
        session.proceed().expect("to strategy");

        session
            .select_round(DisputeRound::Round2Bureau)
            .expect("round selectable on strategy");
        let letter_ticket = session.request_letter().expect("letter requested");
        assert_eq!(letter_ticket.round, DisputeRound::Round2Bureau);
    }

    #[test]
    fn generate_is_idempotently_disabled_while_in_flight() {
        let (mut session, ticket) = open();
        session.apply_analysis(ticket.generation, produced("analysis"));
        session.proceed().expect("to strategy");

        let first = session.request_letter().expect("first request");
        assert_eq!(session.request_letter(), Err(WizardError::LetterPending));

        assert!(session.apply_letter(first.generation, produced("dear creditor")));
        assert_eq!(session.step(), WizardStep::Preview);
    }

    #[test]
    fn edit_round_trip_preserves_letter_until_regenerated() {
        let (mut session, ticket) = open();
        session.apply_analysis(ticket.generation, produced("analysis"));
        session.proceed().expect("to strategy");
        let letter_ticket = session.request_letter().expect("requested");
        session.apply_letter(letter_ticket.generation, produced("first draft"));

        session.edit_strategy().expect("back to strategy");
        assert_eq!(session.letter(), Some(&produced("first draft")));

        let regenerate = session.request_letter().expect("second request");
        session.apply_letter(regenerate.generation, produced("second draft"));
        assert_eq!(session.letter(), Some(&produced("second draft")));
        assert_eq!(session.step(), WizardStep::Preview);
    }

    #[test]
    fn failed_outcome_renders_fallback_but_stays_distinguishable() {
        let (mut session, ticket) = open();
        session.apply_analysis(
            ticket.generation,
            CollaboratorOutcome::Failed("timed out".to_string()),
        );

        let view = session.view();
        assert_eq!(view.analysis.as_deref(), Some(ANALYSIS_FALLBACK));
        assert!(session
            .analysis()
            .expect("outcome recorded")
            .is_failure());
    }

    #[test]
    fn unsolicited_letter_outcome_is_ignored() {
        let (mut session, ticket) = open();
        session.apply_analysis(ticket.generation, produced("analysis"));
        assert!(!session.apply_letter(ticket.generation, produced("unexpected letter")));
        assert!(session.letter().is_none());
    }

    #[test]
    fn transitions_reject_wrong_steps() {
        let (mut session, ticket) = open();
        assert!(matches!(
            session.back(),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.edit_strategy(),
            Err(WizardError::InvalidTransition { .. })
        ));

        session.apply_analysis(ticket.generation, produced("analysis"));
        assert!(matches!(
            session.request_letter(),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn round_labels_match_wire_identifiers() {
        assert_eq!(DisputeRound::Round1Creditor.label(), "ROUND_1_CREDITOR");
        assert_eq!(
            serde_json::from_str::<DisputeRound>("\"ROUND_2_BUREAU\"").expect("parses"),
            DisputeRound::Round2Bureau
        );
        assert_eq!(DisputeRound::default(), DisputeRound::Round1Creditor);
    }
}
