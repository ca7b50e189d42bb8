//! Prompt templates for the analysis and letter-generation calls.
//!
//! Prompts serialize the tradeline into structured text (missing bureaus
//! rendered as an explicit "no data" row) so the collaborator reasons about
//! the reported facts rather than re-deriving them.

use std::fmt::Write as _;

use crate::bureaus::{Bureau, CreditAccount};
use crate::disputes::comparator::NO_DATA;
use crate::disputes::wizard::DisputeRound;

/// Render one account as a compact per-bureau table for prompt context.
pub fn account_digest(account: &CreditAccount) -> String {
    let mut digest = String::with_capacity(512);
    let _ = writeln!(
        digest,
        "Account: {} ({}) [{}]",
        account.creditor_name,
        account.category.label(),
        account.id
    );

    for bureau in Bureau::ALL {
        match account.records.get(&bureau) {
            Some(record) => {
                let _ = writeln!(
                    digest,
                    "{}: balance=${} status={} date_opened={} last_activity={} account_number={}",
                    bureau.label(),
                    record.balance,
                    record.status,
                    record.date_opened.format("%Y-%m-%d"),
                    record.last_activity.format("%Y-%m-%d"),
                    record.account_number,
                );
            }
            None => {
                let _ = writeln!(digest, "{}: {}", bureau.label(), NO_DATA);
            }
        }
    }

    digest
}

/// Build the cross-bureau analysis prompt for one tradeline.
pub fn analysis_prompt(account: &CreditAccount) -> String {
    format!(
        "You are an expert FCRA (Fair Credit Reporting Act) compliance analyst.\n\
         Analyze the following credit account data for a single trade line across \
         three bureaus (Experian, Equifax, TransUnion).\n\
         Identify SPECIFIC factual inconsistencies such as:\n\
         - Mismatched balances\n\
         - Mismatched \"Date Opened\" or \"Date of Last Activity\"\n\
         - Inconsistent account status (e.g., Current vs Late)\n\
         - Missing data from one bureau\n\
         \n\
         Data:\n\
         {digest}\n\
         Output Format:\n\
         Return a bulleted list of 2-3 key factual errors found. If the data looks \
         consistent, suggest verifying the \"Method of Verification\".\n\
         Keep the tone professional and analytical. Do not promise a deletion.",
        digest = account_digest(account),
    )
}

/// Build the letter prompt for the chosen round. The round selects the
/// template; nothing else depends on it.
pub fn letter_prompt(account: &CreditAccount, inconsistencies: &str, round: DisputeRound) -> String {
    match round {
        DisputeRound::Round1Creditor => format!(
            "Write a \"Validation Demand Letter\" to the DATA FURNISHER (Creditor: {creditor}).\n\
             OBJECTIVE: Demand proof of the debt and accuracy of reporting under FCRA Section 623.\n\
             KEY FACTS:\n\
             {inconsistencies}\n\
             \n\
             INSTRUCTIONS:\n\
             - Use a formal, legalistic but polite tone.\n\
             - Reference the factual inconsistencies explicitly.\n\
             - Demand \"original wet-ink contract\" or \"proof of accounting\".\n\
             - DO NOT admit ownership of the debt. Use phrases like \"alleged account\".\n\
             - Structure it with placeholders for [My Name], [My Address], [Date].",
            creditor = account.creditor_name,
        ),
        DisputeRound::Round2Bureau => format!(
            "Write a \"Method of Verification Request\" to the CREDIT BUREAUS.\n\
             OBJECTIVE: Follow up on a previous dispute under FCRA Section 611(a)(7).\n\
             KEY FACTS:\n\
             The creditor failed to validate the debt properly in Round 1.\n\
             {inconsistencies}\n\
             \n\
             INSTRUCTIONS:\n\
             - Demand the specific description of the procedure used to determine the accuracy.\n\
             - Ask for the name and address of the person contacted at the creditor.\n\
             - Cite FCRA Section 611 explicitly.\n\
             - Structure it with placeholders for [My Name], [My Address], [Date].",
        ),
    }
}
