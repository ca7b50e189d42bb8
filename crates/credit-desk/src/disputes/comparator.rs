//! Cross-bureau comparison rule engine.
//!
//! For each compared field the engine applies an equality predicate (exact
//! match for status and dates, tolerance-banded match for balances) and
//! classifies the tradeline as consistent, inconsistent on specific fields,
//! or incomplete when a bureau has no snapshot at all. Missing data is always
//! surfaced explicitly rather than omitted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bureaus::{Bureau, BureauRecord, CreditAccount};

/// Rendered stand-in for an absent bureau value.
pub const NO_DATA: &str = "no data";

/// Fields the engine compares across bureaus. The masked account number is
/// deliberately excluded; masking differs per bureau by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparedField {
    Balance,
    Status,
    DateOpened,
    LastActivity,
}

impl ComparedField {
    pub const ALL: [ComparedField; 4] = [
        ComparedField::Balance,
        ComparedField::Status,
        ComparedField::DateOpened,
        ComparedField::LastActivity,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ComparedField::Balance => "Balance",
            ComparedField::Status => "Status",
            ComparedField::DateOpened => "Date Opened",
            ComparedField::LastActivity => "Last Active",
        }
    }
}

/// Tolerance configuration for the comparison predicates.
///
/// `balance_tolerance` is in whole currency units. The default of zero treats
/// any balance delta as a mismatch; callers wanting materiality filtering can
/// widen the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparatorConfig {
    pub balance_tolerance: u32,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: 0,
        }
    }
}

/// Typed sample of one field from one bureau's snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldSample {
    Money(u32),
    Text(String),
    Date(NaiveDate),
}

impl FieldSample {
    fn display(&self) -> String {
        match self {
            FieldSample::Money(amount) => format!("${amount}"),
            FieldSample::Text(text) => text.clone(),
            FieldSample::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Per-field view of one tradeline across all three bureaus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldComparison {
    pub field: ComparedField,
    /// Value per bureau; `None` marks a bureau with no snapshot.
    pub values: BTreeMap<Bureau, Option<String>>,
    /// Bureaus whose value disagrees with the reference (majority) value.
    pub outliers: Vec<Bureau>,
}

/// Classification of a tradeline's cross-bureau state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CrossBureauState {
    Consistent,
    Inconsistent(Vec<ComparedField>),
    Incomplete(Vec<Bureau>),
}

/// Full comparison report for a single tradeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradelineComparison {
    pub account_id: String,
    pub creditor_name: String,
    pub fields: Vec<FieldComparison>,
    pub missing_bureaus: Vec<Bureau>,
    pub state: CrossBureauState,
}

impl TradelineComparison {
    /// Fields with at least one disagreeing bureau.
    pub fn disputed_fields(&self) -> Vec<ComparedField> {
        self.fields
            .iter()
            .filter(|comparison| !comparison.outliers.is_empty())
            .map(|comparison| comparison.field)
            .collect()
    }
}

/// Stateless engine applying the tolerance configuration to tradelines.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    config: ComparatorConfig,
}

impl Comparator {
    pub fn new(config: ComparatorConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, account: &CreditAccount) -> TradelineComparison {
        let missing_bureaus = account.missing_bureaus();

        let fields: Vec<FieldComparison> = ComparedField::ALL
            .iter()
            .map(|field| self.compare_field(*field, account))
            .collect();

        let disputed: Vec<ComparedField> = fields
            .iter()
            .filter(|comparison| !comparison.outliers.is_empty())
            .map(|comparison| comparison.field)
            .collect();

        // A field mismatch among present bureaus outranks a missing snapshot;
        // the missing bureaus stay on the report either way.
        let state = if !disputed.is_empty() {
            CrossBureauState::Inconsistent(disputed)
        } else if !missing_bureaus.is_empty() {
            CrossBureauState::Incomplete(missing_bureaus.clone())
        } else {
            CrossBureauState::Consistent
        };

        TradelineComparison {
            account_id: account.id.clone(),
            creditor_name: account.creditor_name.clone(),
            fields,
            missing_bureaus,
            state,
        }
    }

    fn compare_field(&self, field: ComparedField, account: &CreditAccount) -> FieldComparison {
        let mut values = BTreeMap::new();
        let mut samples: Vec<(Bureau, FieldSample)> = Vec::new();

        for bureau in Bureau::ALL {
            match account.records.get(&bureau) {
                Some(record) => {
                    let sample = extract(field, record);
                    values.insert(bureau, Some(sample.display()));
                    samples.push((bureau, sample));
                }
                None => {
                    values.insert(bureau, None);
                }
            }
        }

        let outliers = self.outliers(&samples);

        FieldComparison {
            field,
            values,
            outliers,
        }
    }

    /// Group present samples into equivalence classes and flag every bureau
    /// outside the largest class. Ties are broken toward the class containing
    /// the earliest bureau in canonical order, keeping the result
    /// deterministic when only two bureaus report and they disagree.
    fn outliers(&self, samples: &[(Bureau, FieldSample)]) -> Vec<Bureau> {
        if samples.len() < 2 {
            return Vec::new();
        }

        let mut classes: Vec<Vec<usize>> = Vec::new();
        for (index, (_, sample)) in samples.iter().enumerate() {
            let existing = classes.iter_mut().find(|class| {
                let representative = &samples[class[0]].1;
                self.matches(representative, sample)
            });
            match existing {
                Some(class) => class.push(index),
                None => classes.push(vec![index]),
            }
        }

        if classes.len() == 1 {
            return Vec::new();
        }

        let reference = classes
            .iter()
            .enumerate()
            .max_by(|(a_pos, a), (b_pos, b)| {
                a.len().cmp(&b.len()).then(b_pos.cmp(a_pos))
            })
            .map(|(position, _)| position)
            .unwrap_or(0);

        classes
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != reference)
            .flat_map(|(_, class)| class.iter().map(|index| samples[*index].0))
            .collect()
    }

    fn matches(&self, left: &FieldSample, right: &FieldSample) -> bool {
        match (left, right) {
            (FieldSample::Money(a), FieldSample::Money(b)) => {
                a.abs_diff(*b) <= self.config.balance_tolerance
            }
            (FieldSample::Text(a), FieldSample::Text(b)) => a == b,
            (FieldSample::Date(a), FieldSample::Date(b)) => a == b,
            _ => false,
        }
    }
}

fn extract(field: ComparedField, record: &BureauRecord) -> FieldSample {
    match field {
        ComparedField::Balance => FieldSample::Money(record.balance),
        ComparedField::Status => FieldSample::Text(record.status.clone()),
        ComparedField::DateOpened => FieldSample::Date(record.date_opened),
        ComparedField::LastActivity => FieldSample::Date(record.last_activity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bureaus::catalog::sample_accounts;

    fn account(id: &str) -> CreditAccount {
        sample_accounts()
            .into_iter()
            .find(|account| account.id == id)
            .expect("fixture account exists")
    }

    #[test]
    fn chase_flags_transunion_balance_and_equifax_dates() {
        let comparator = Comparator::default();
        let report = comparator.assess(&account("acct_123"));

        let balance = &report.fields[0];
        assert_eq!(balance.field, ComparedField::Balance);
        assert_eq!(balance.outliers, vec![Bureau::TransUnion]);

        let date_opened = report
            .fields
            .iter()
            .find(|comparison| comparison.field == ComparedField::DateOpened)
            .expect("date opened compared");
        assert_eq!(date_opened.outliers, vec![Bureau::Equifax]);

        let last_activity = report
            .fields
            .iter()
            .find(|comparison| comparison.field == ComparedField::LastActivity)
            .expect("last activity compared");
        assert_eq!(last_activity.outliers, vec![Bureau::Equifax]);

        match &report.state {
            CrossBureauState::Inconsistent(fields) => {
                assert!(fields.contains(&ComparedField::Balance));
                assert!(fields.contains(&ComparedField::DateOpened));
                assert!(fields.contains(&ComparedField::LastActivity));
            }
            other => panic!("expected inconsistent tradeline, got {other:?}"),
        }
    }

    #[test]
    fn chase_status_split_flags_the_minority_bureau() {
        // Experian and TransUnion agree on "Late 30"; Equifax reports
        // "Current" and is the outlier.
        let comparator = Comparator::default();
        let report = comparator.assess(&account("acct_123"));
        let status = report
            .fields
            .iter()
            .find(|comparison| comparison.field == ComparedField::Status)
            .expect("status compared");
        assert_eq!(status.outliers, vec![Bureau::Equifax]);
    }

    #[test]
    fn missing_transunion_is_incomplete_not_mismatched() {
        let comparator = Comparator::default();
        let report = comparator.assess(&account("acct_456"));

        assert_eq!(report.missing_bureaus, vec![Bureau::TransUnion]);
        assert_eq!(
            report.state,
            CrossBureauState::Incomplete(vec![Bureau::TransUnion])
        );
        assert!(report.disputed_fields().is_empty());

        let balance = &report.fields[0];
        assert_eq!(balance.values[&Bureau::TransUnion], None);
        assert_eq!(
            balance.values[&Bureau::Experian],
            Some("$1200".to_string())
        );
    }

    #[test]
    fn fully_aligned_account_is_consistent() {
        let comparator = Comparator::default();
        let report = comparator.assess(&account("acct_789"));
        assert_eq!(report.state, CrossBureauState::Consistent);
        assert!(report.missing_bureaus.is_empty());
        assert!(report
            .fields
            .iter()
            .all(|comparison| comparison.outliers.is_empty()));
    }

    #[test]
    fn balance_tolerance_band_absorbs_small_drift() {
        let comparator = Comparator::new(ComparatorConfig {
            balance_tolerance: 100,
        });
        let report = comparator.assess(&account("acct_123"));

        let balance = &report.fields[0];
        assert!(balance.outliers.is_empty(), "a $50 drift sits inside the band");

        // Dates still mismatch exactly, so the tradeline stays inconsistent.
        match &report.state {
            CrossBureauState::Inconsistent(fields) => {
                assert!(!fields.contains(&ComparedField::Balance));
                assert!(fields.contains(&ComparedField::DateOpened));
            }
            other => panic!("expected inconsistent tradeline, got {other:?}"),
        }
    }

    #[test]
    fn inconsistency_outranks_missing_snapshot() {
        let mut account = account("acct_456");
        if let Some(record) = account.records.get_mut(&Bureau::Equifax) {
            record.balance = 1300;
        }

        let comparator = Comparator::default();
        let report = comparator.assess(&account);

        assert!(matches!(report.state, CrossBureauState::Inconsistent(_)));
        // The missing bureau is still reported alongside the mismatch.
        assert_eq!(report.missing_bureaus, vec![Bureau::TransUnion]);
    }
}
