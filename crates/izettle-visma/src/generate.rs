//! Building the vouchers that are missing from Visma.

use std::fmt;

use crate::error::{ReconcileError, ReconcileResult};
use crate::reconcile::Matcher;
use crate::report::Report;
use crate::voucher::{CostCenterItem, Project, Voucher, VoucherRow};

/// A voucher ready to be created, together with the receipts to attach to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVoucher {
    pub voucher: Voucher,
    pub username: String,
    pub attachments: Vec<Vec<u8>>,
}

impl PendingVoucher {
    pub fn attachment_name(&self, index: usize) -> String {
        if index == 0 {
            format!("{}_{}.pdf", self.username, self.voucher.date)
        } else {
            format!("{}_{}_{}.pdf", self.username, self.voucher.date, index + 1)
        }
    }
}

impl fmt::Display for PendingVoucher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.voucher)?;
        for index in 0..self.attachments.len() {
            writeln!(f, "  attachment {}", self.attachment_name(index))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Generated {
    pub pending: Vec<PendingVoucher>,
    /// Reports whose user has no cost center; nothing is generated for them.
    pub ignored: Vec<Report>,
}

pub struct Generator<'a> {
    matcher: Matcher<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(matcher: Matcher<'a>) -> Self {
        Generator { matcher }
    }

    /// One balanced voucher per report: the full sum debited to the ledger
    /// account, credited back per product account.
    pub fn generate(
        &self,
        unmatched_reports: Vec<Report>,
        cost_center_items: &[CostCenterItem],
        project: &Project,
    ) -> ReconcileResult<Generated> {
        let config = self.matcher.config();
        let mut generated = Generated::default();

        for report in unmatched_reports {
            if report.rows.is_empty() {
                tracing::warn!(user = %report.username, date = %report.date, "report has no rows, no voucher generated");
                continue;
            }
            let Some(cost_center) = self.matcher.report_cost_center(&report, cost_center_items)
            else {
                tracing::warn!(
                    user = %report.username,
                    date = %report.date,
                    "no cost center for user, the name may be wrong in iZettle or the \
                     committee is missing in Visma"
                );
                generated.ignored.push(report);
                continue;
            };

            let account_rows = report.rows_by_account()?;
            let mut rows = Vec::with_capacity(account_rows.len() + 1);
            rows.push(
                VoucherRow::debit(config.ledger_account, report.total())
                    .with_cost_center(&cost_center.id)
                    .with_project(&project.id),
            );
            rows.extend(account_rows.iter().map(|row| {
                VoucherRow::credit(row.account, row.amount)
                    .with_cost_center(&cost_center.id)
                    .with_project(&project.id)
            }));

            let voucher = Voucher::new(report.date, &config.voucher_text, rows);
            if !voucher.is_balanced() {
                return Err(ReconcileError::Unbalanced {
                    date: voucher.date,
                    debit: voucher.debit_total(),
                    credit: voucher.credit_total(),
                });
            }

            tracing::debug!(user = %report.username, date = %report.date, total = %report.total(), "generated voucher");
            generated.pending.push(PendingVoucher {
                voucher,
                username: report.username,
                attachments: report.attachments,
            });
        }

        Ok(generated)
    }
}

/// Looks up the project new vouchers are tagged with.
pub fn find_project<'p>(projects: &'p [Project], number: &str) -> ReconcileResult<&'p Project> {
    projects
        .iter()
        .find(|project| project.number == number)
        .ok_or_else(|| ReconcileError::ProjectNotFound {
            number: number.to_owned(),
        })
}
