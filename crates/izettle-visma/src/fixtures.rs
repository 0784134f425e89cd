//! Shared builders for unit tests.

use chrono::NaiveDate;

use crate::Decimal;
use crate::config::{ReconcileConfig, UserMapping, UserMappings};
use crate::report::{Report, ReportRow};
use crate::voucher::{CostCenterItem, Project, Voucher, VoucherRow, VoucherType};

pub const LEDGER: u32 = 1690;
pub const BANK: u32 = 1930;
pub const OTHER_INCOME: u32 = 3110;

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn config() -> ReconcileConfig {
    let mappings = UserMappings::new(vec![
        UserMapping::new("zenith", "Zenith"),
        UserMapping::new("zik", "ZIK"),
        UserMapping::new("nocc", "Missing"),
    ])
    .unwrap();
    ReconcileConfig::new(LEDGER, OTHER_INCOME, mappings)
        .with_bank_accounts([BANK])
        .with_uncategorized_project("1")
}

pub fn cost_centers() -> Vec<CostCenterItem> {
    vec![
        CostCenterItem {
            id: "cc-zenith".to_owned(),
            short_name: "Zenith".to_owned(),
            name: "Zenith Kommittén".to_owned(),
            is_active: true,
        },
        CostCenterItem {
            id: "cc-zik".to_owned(),
            short_name: "ZIK".to_owned(),
            name: "Z-Idrottskommittén".to_owned(),
            is_active: true,
        },
    ]
}

pub fn project() -> Project {
    Project {
        id: "proj-1".to_owned(),
        number: "1".to_owned(),
        name: "Okategoriserat".to_owned(),
    }
}

pub fn report(day: &str, username: &str, rows: &[(&str, Decimal, u32)]) -> Report {
    Report::new(
        date(day),
        format!("user-{username}"),
        username,
        rows.iter()
            .map(|&(product, amount, account)| ReportRow {
                product: product.to_owned(),
                quantity: 1,
                amount,
                account: Some(account),
            })
            .collect(),
    )
}

/// An imported sales voucher: ledger debit on `cost_center`, balanced by one credit row.
pub fn sale_voucher(id: &str, day: &str, cost_center: &str, sum: Decimal) -> Voucher {
    let mut voucher = Voucher::new(
        date(day),
        "Uncategorized iZettle Import",
        vec![
            VoucherRow::debit(LEDGER, sum).with_cost_center(cost_center),
            VoucherRow::credit(3001, sum).with_cost_center(cost_center),
        ],
    );
    voucher.id = Some(id.to_owned());
    voucher.number = Some(format!("A{id}"));
    voucher.voucher_type = Some(VoucherType::SieImport);
    voucher
}

/// A bank settlement moving money out of the ledger account.
pub fn settlement_voucher(id: &str, day: &str, sum: Decimal) -> Voucher {
    let mut voucher = Voucher::new(
        date(day),
        "iZettle utbetalning",
        vec![
            VoucherRow::debit(BANK, sum),
            VoucherRow::credit(LEDGER, sum),
        ],
    );
    voucher.id = Some(id.to_owned());
    voucher.voucher_type = Some(VoucherType::BankTransactionDeposit);
    voucher
}
