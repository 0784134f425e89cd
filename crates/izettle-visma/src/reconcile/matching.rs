use crate::Decimal;
use crate::error::{ReconcileError, ReconcileResult};
use crate::report::Report;
use crate::voucher::{CostCenterItem, Voucher, VoucherRow};

use super::Matcher;

impl Matcher<'_> {
    fn ledger_row<'v>(&self, voucher: &'v Voucher) -> Option<&'v VoucherRow> {
        voucher
            .rows
            .iter()
            .find(|row| row.account_number == self.config.ledger_account)
    }

    /// Touches the ledger account without being a bank settlement.
    pub fn is_relevant(&self, voucher: &Voucher) -> bool {
        let touches_ledger = self.ledger_row(voucher).is_some();
        let touches_bank = voucher
            .rows
            .iter()
            .any(|row| self.config.bank_accounts.contains(&row.account_number));
        touches_ledger && !touches_bank
    }

    /// The cost center on the voucher's ledger row.
    pub fn voucher_cost_center<'c>(
        &self,
        voucher: &Voucher,
        cost_center_items: &'c [CostCenterItem],
    ) -> ReconcileResult<&'c CostCenterItem> {
        let row = self
            .ledger_row(voucher)
            .ok_or_else(|| ReconcileError::NotRelevant {
                voucher: voucher.label(),
                ledger_account: self.config.ledger_account,
            })?;
        let id = match row.cost_center_item_id1.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(ReconcileError::CostCenterNotSet {
                    voucher: voucher.label(),
                });
            }
        };
        cost_center_items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| ReconcileError::CostCenterUnresolvable {
                voucher: voucher.label(),
                cost_center_id: id.to_owned(),
            })
    }

    /// The amount debited to the ledger account.
    pub fn voucher_sum(&self, voucher: &Voucher) -> ReconcileResult<Decimal> {
        self.ledger_row(voucher)
            .map(|row| row.debit_amount)
            .ok_or_else(|| ReconcileError::NoLedgerRow {
                voucher: voucher.label(),
            })
    }

    pub fn same_user(&self, report: &Report, cost_center: &CostCenterItem) -> bool {
        self.config
            .user_mappings
            .contains(&report.username, &cost_center.short_name)
    }

    /// First cost center the report's user is mapped to.
    pub fn report_cost_center<'c>(
        &self,
        report: &Report,
        cost_center_items: &'c [CostCenterItem],
    ) -> Option<&'c CostCenterItem> {
        cost_center_items
            .iter()
            .find(|item| self.same_user(report, item))
    }

    /// Whether the voucher books the sale summarized by the report.
    ///
    /// Same day and same user but a different sum is an error rather than a
    /// mismatch: it means the books disagree with iZettle.
    pub fn is_same_sale(
        &self,
        report: &Report,
        voucher: &Voucher,
        cost_center_items: &[CostCenterItem],
    ) -> ReconcileResult<bool> {
        let sale = self.voucher_sale(voucher, cost_center_items)?;
        sale.matches(self, report)
    }

    /// Resolves everything a voucher is compared by, failing on broken vouchers
    /// regardless of whether any report falls on the same day.
    pub(super) fn voucher_sale<'v, 'c>(
        &self,
        voucher: &'v Voucher,
        cost_center_items: &'c [CostCenterItem],
    ) -> ReconcileResult<VoucherSale<'v, 'c>> {
        Ok(VoucherSale {
            voucher,
            cost_center: self.voucher_cost_center(voucher, cost_center_items)?,
            sum: self.voucher_sum(voucher)?,
        })
    }
}

pub(super) struct VoucherSale<'v, 'c> {
    pub voucher: &'v Voucher,
    pub cost_center: &'c CostCenterItem,
    pub sum: Decimal,
}

impl VoucherSale<'_, '_> {
    pub fn matches(&self, matcher: &Matcher<'_>, report: &Report) -> ReconcileResult<bool> {
        if self.voucher.date != report.date {
            return Ok(false);
        }
        if !matcher.same_user(report, self.cost_center) {
            return Ok(false);
        }
        let report_sum = report.total();
        if self.sum != report_sum {
            return Err(ReconcileError::SumMismatch {
                voucher: self.voucher.label(),
                date: report.date,
                username: report.username.clone(),
                voucher_sum: self.sum,
                report_sum,
            });
        }
        Ok(true)
    }
}
