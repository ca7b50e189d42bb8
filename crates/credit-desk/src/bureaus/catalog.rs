//! Mock tradeline catalog standing in for the external data provider.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{AccountCategory, Bureau, BureauRecord, CreditAccount};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn record(
    balance: u32,
    status: &str,
    opened: NaiveDate,
    last_activity: NaiveDate,
    account_number: &str,
) -> BureauRecord {
    BureauRecord {
        balance,
        status: status.to_string(),
        date_opened: opened,
        last_activity,
        account_number: account_number.to_string(),
    }
}

/// The fixed set of sample accounts served while no live bureau feed exists.
///
/// `acct_123` carries a balance drift at TransUnion and date drift at Equifax,
/// `acct_456` is missing its TransUnion snapshot entirely, and `acct_789`
/// reports identically everywhere.
pub fn sample_accounts() -> Vec<CreditAccount> {
    vec![
        CreditAccount {
            id: "acct_123".to_string(),
            creditor_name: "JPMORGAN CHASE".to_string(),
            category: AccountCategory::CreditCard,
            records: BTreeMap::from([
                (
                    Bureau::Experian,
                    record(
                        5400,
                        "Late 30",
                        date(2019, 5, 12),
                        date(2023, 11, 1),
                        "****1234",
                    ),
                ),
                (
                    Bureau::Equifax,
                    record(
                        5400,
                        "Current",
                        date(2019, 5, 15),
                        date(2023, 10, 28),
                        "****1234",
                    ),
                ),
                (
                    Bureau::TransUnion,
                    record(
                        5450,
                        "Late 30",
                        date(2019, 5, 12),
                        date(2023, 11, 1),
                        "****1234",
                    ),
                ),
            ]),
        },
        CreditAccount {
            id: "acct_456".to_string(),
            creditor_name: "MIDLAND CREDIT MGMT".to_string(),
            category: AccountCategory::Collection,
            records: BTreeMap::from([
                (
                    Bureau::Experian,
                    record(
                        1200,
                        "Collection",
                        date(2020, 1, 10),
                        date(2022, 4, 15),
                        "889900**",
                    ),
                ),
                (
                    Bureau::Equifax,
                    record(
                        1200,
                        "Collection",
                        date(2020, 1, 10),
                        date(2022, 4, 15),
                        "889900**",
                    ),
                ),
            ]),
        },
        CreditAccount {
            id: "acct_789".to_string(),
            creditor_name: "CAPITAL ONE AUTO".to_string(),
            category: AccountCategory::AutoLoan,
            records: Bureau::ALL
                .iter()
                .map(|bureau| {
                    (
                        *bureau,
                        record(
                            15400,
                            "Current",
                            date(2021, 8, 1),
                            date(2023, 12, 1),
                            "5566****",
                        ),
                    )
                })
                .collect(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_the_three_fixtures() {
        let accounts = sample_accounts();
        let ids: Vec<&str> = accounts.iter().map(|account| account.id.as_str()).collect();
        assert_eq!(ids, vec!["acct_123", "acct_456", "acct_789"]);
    }

    #[test]
    fn collection_account_lacks_transunion() {
        let accounts = sample_accounts();
        let midland = &accounts[1];
        assert_eq!(midland.missing_bureaus(), vec![Bureau::TransUnion]);
        assert_eq!(midland.records.len(), 2);
    }

    #[test]
    fn chase_balance_drifts_at_transunion() {
        let accounts = sample_accounts();
        let chase = &accounts[0];
        assert_eq!(chase.records[&Bureau::Experian].balance, 5400);
        assert_eq!(chase.records[&Bureau::TransUnion].balance, 5450);
        assert_ne!(
            chase.records[&Bureau::Equifax].date_opened,
            chase.records[&Bureau::Experian].date_opened
        );
    }
}
