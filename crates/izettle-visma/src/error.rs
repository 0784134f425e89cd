use chrono::NaiveDate;

use crate::Decimal;

/// Conditions that stop a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("voucher {voucher} has no row on the ledger account {ledger_account}")]
    NotRelevant { voucher: String, ledger_account: u32 },

    #[error("voucher {voucher} does not have a cost center set")]
    CostCenterNotSet { voucher: String },

    #[error("voucher {voucher} references unknown cost center {cost_center_id}")]
    CostCenterUnresolvable {
        voucher: String,
        cost_center_id: String,
    },

    #[error("voucher {voucher} has no ledger row to take the sum from")]
    NoLedgerRow { voucher: String },

    #[error(
        "found voucher {voucher} with matching date and user but mismatched sum: \
         {date} {username}, voucher {voucher_sum} != report {report_sum}"
    )]
    SumMismatch {
        voucher: String,
        date: NaiveDate,
        username: String,
        voucher_sum: Decimal,
        report_sum: Decimal,
    },

    #[error("report {date} {username} contains '{product}' without a bookkeeping account")]
    MissingAccount {
        date: NaiveDate,
        username: String,
        product: String,
    },

    #[error("no project with number '{number}' exists in the bookkeeping system")]
    ProjectNotFound { number: String },

    #[error("generated voucher for {date} is unbalanced: debit {debit} != credit {credit}")]
    Unbalanced {
        date: NaiveDate,
        debit: Decimal,
        credit: Decimal,
    },

    #[error("amount for '{product}' is out of range")]
    AmountOverflow { product: String },

    #[error("user '{username}' is mapped to more than one cost center")]
    DuplicateUserMapping { username: String },
}

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
