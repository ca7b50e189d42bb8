//! Read-only snapshots of tradeline data as reported by the three major
//! consumer credit bureaus. Records arrive from an external data provider
//! (mocked in [`catalog`]) and are never mutated after construction.

pub mod agencies;
pub mod catalog;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One of the three major consumer credit reporting agencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bureau {
    Equifax,
    Experian,
    TransUnion,
}

impl Bureau {
    pub const ALL: [Bureau; 3] = [Bureau::Equifax, Bureau::Experian, Bureau::TransUnion];

    pub const fn label(self) -> &'static str {
        match self {
            Bureau::Equifax => "Equifax",
            Bureau::Experian => "Experian",
            Bureau::TransUnion => "TransUnion",
        }
    }
}

/// Category of the reported obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCategory {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Auto Loan")]
    AutoLoan,
    Collection,
    #[serde(rename = "Student Loan")]
    StudentLoan,
}

impl AccountCategory {
    pub const fn label(self) -> &'static str {
        match self {
            AccountCategory::CreditCard => "Credit Card",
            AccountCategory::AutoLoan => "Auto Loan",
            AccountCategory::Collection => "Collection",
            AccountCategory::StudentLoan => "Student Loan",
        }
    }
}

/// Snapshot of a tradeline as one bureau reports it.
///
/// `account_number` is a display-masked string and the masking differs per
/// bureau, so it is excluded from cross-bureau comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BureauRecord {
    pub balance: u32,
    pub status: String,
    pub date_opened: NaiveDate,
    pub last_activity: NaiveDate,
    pub account_number: String,
}

/// A single credit account with its per-bureau snapshots.
///
/// Any bureau may be absent from `records`; absence is itself a discrepancy
/// signal and is surfaced by the comparator rather than hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditAccount {
    pub id: String,
    pub creditor_name: String,
    pub category: AccountCategory,
    pub records: BTreeMap<Bureau, BureauRecord>,
}

impl CreditAccount {
    /// Bureaus with no snapshot for this account, in canonical order.
    pub fn missing_bureaus(&self) -> Vec<Bureau> {
        Bureau::ALL
            .iter()
            .copied()
            .filter(|bureau| !self.records.contains_key(bureau))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bureau_serializes_with_original_labels() {
        assert_eq!(
            serde_json::to_string(&Bureau::TransUnion).expect("serializes"),
            "\"TransUnion\""
        );
        assert_eq!(
            serde_json::from_str::<Bureau>("\"Equifax\"").expect("deserializes"),
            Bureau::Equifax
        );
    }

    #[test]
    fn category_round_trips_display_labels() {
        let json = serde_json::to_string(&AccountCategory::AutoLoan).expect("serializes");
        assert_eq!(json, "\"Auto Loan\"");
        let back: AccountCategory = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, AccountCategory::AutoLoan);
    }

    #[test]
    fn missing_bureaus_follow_canonical_order() {
        let account = CreditAccount {
            id: "acct_test".to_string(),
            creditor_name: "TEST BANK".to_string(),
            category: AccountCategory::CreditCard,
            records: BTreeMap::new(),
        };
        assert_eq!(account.missing_bureaus(), Bureau::ALL.to_vec());
    }
}
