//! Daily sales reports, one per iZettle user and day.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::Decimal;
use crate::error::{ReconcileError, ReconcileResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub product: String,
    pub quantity: i64,
    pub amount: Decimal,
    /// Visma account the sale is credited to. `None` is only valid until the
    /// report is turned into a voucher.
    pub account: Option<u32>,
}

/// Sum of all rows sharing one bookkeeping account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRow {
    pub account: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub date: NaiveDate,
    pub user_key: String,
    pub username: String,
    pub rows: Vec<ReportRow>,
    /// PDF receipts, filled in once the report is known to be unmatched.
    pub attachments: Vec<Vec<u8>>,
}

impl Report {
    pub fn new(
        date: NaiveDate,
        user_key: impl Into<String>,
        username: impl Into<String>,
        rows: Vec<ReportRow>,
    ) -> Self {
        Report {
            date,
            user_key: user_key.into(),
            username: username.into(),
            rows,
            attachments: Vec::new(),
        }
    }

    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|row| row.amount).sum()
    }

    /// Re-buckets the rows per bookkeeping account, ordered by account number.
    pub fn rows_by_account(&self) -> ReconcileResult<Vec<AccountRow>> {
        let mut accounts: BTreeMap<u32, Decimal> = BTreeMap::new();
        for row in &self.rows {
            let account = match row.account {
                Some(account) if account != 0 => account,
                _ => {
                    return Err(ReconcileError::MissingAccount {
                        date: self.date,
                        username: self.username.clone(),
                        product: row.product.clone(),
                    });
                }
            };
            *accounts.entry(account).or_default() += row.amount;
        }

        Ok(accounts
            .into_iter()
            .map(|(account, amount)| AccountRow { account, amount })
            .collect())
    }

    pub fn attachment_name(&self) -> String {
        format!("{}_{}.pdf", self.username, self.date)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} ({})  total {}", self.date, self.username, self.user_key, self.total())?;
        for row in &self.rows {
            let account = row
                .account
                .map(|account| account.to_string())
                .unwrap_or_else(|| "????".to_owned());
            writeln!(f, "  {account}\t{} x {}\t{}", row.quantity, row.product, row.amount)?;
        }
        Ok(())
    }
}

/// Strips the decoration iZettle puts on sub-account names (`"Zenith ."` becomes `"Zenith"`).
pub fn normalize_username(name: &str, separator: &str) -> String {
    let name = name.trim();
    let name = if separator.is_empty() {
        name
    } else {
        name.split(separator).next().unwrap_or(name)
    };
    name.trim().to_owned()
}
