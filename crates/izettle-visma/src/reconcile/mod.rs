//! Pairing iZettle daily reports with the vouchers already in Visma.

mod matching;

use crate::config::ReconcileConfig;
use crate::error::ReconcileResult;
use crate::report::Report;
use crate::voucher::{CostCenterItem, Voucher};

#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    config: &'a ReconcileConfig,
}

impl<'a> Matcher<'a> {
    pub fn new(config: &'a ReconcileConfig) -> Self {
        Matcher { config }
    }

    pub fn config(&self) -> &'a ReconcileConfig {
        self.config
    }

    /// Reports that no relevant voucher books yet.
    ///
    /// Any broken relevant voucher fails the whole call, as does a voucher
    /// disagreeing with a report on the sum.
    pub fn unmatched_reports(
        &self,
        reports: &[Report],
        vouchers: &[Voucher],
        cost_center_items: &[CostCenterItem],
    ) -> ReconcileResult<Vec<Report>> {
        let sales = vouchers
            .iter()
            .filter(|voucher| self.is_relevant(voucher))
            .map(|voucher| self.voucher_sale(voucher, cost_center_items))
            .collect::<ReconcileResult<Vec<_>>>()?;

        // PERF: O(reports*vouchers)
        let mut unmatched = Vec::new();
        for report in reports {
            let mut matched = None;
            for sale in &sales {
                if sale.matches(self, report)? {
                    matched = Some(sale.voucher);
                    break;
                }
            }
            match matched {
                Some(voucher) if !voucher.is_import() => {
                    tracing::warn!(
                        voucher = %voucher.label(),
                        date = %report.date,
                        user = %report.username,
                        "voucher was not created by an import but is used in place of a new one"
                    );
                }
                Some(voucher) => {
                    tracing::debug!(voucher = %voucher.label(), date = %report.date, user = %report.username, "report matched");
                }
                None => unmatched.push(report.clone()),
            }
        }

        tracing::info!(
            reports = reports.len(),
            unmatched = unmatched.len(),
            "matched reports against vouchers"
        );
        Ok(unmatched)
    }

    /// Imported vouchers on the ledger account without a report behind them.
    /// These need a human to look at them.
    pub fn unmatched_vouchers(
        &self,
        reports: &[Report],
        vouchers: &[Voucher],
        cost_center_items: &[CostCenterItem],
    ) -> ReconcileResult<Vec<Voucher>> {
        let mut unmatched = Vec::new();
        for voucher in vouchers {
            if !voucher.is_import() || !self.is_relevant(voucher) {
                continue;
            }
            let sale = self.voucher_sale(voucher, cost_center_items)?;
            let mut exists = false;
            for report in reports {
                if sale.matches(self, report)? {
                    exists = true;
                    break;
                }
            }
            if !exists {
                unmatched.push(voucher.clone());
            }
        }

        if !unmatched.is_empty() {
            tracing::warn!(count = unmatched.len(), "imported vouchers without a report");
        }
        Ok(unmatched)
    }
}
