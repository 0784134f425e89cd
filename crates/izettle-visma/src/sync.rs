//! One reconciliation pass: read both systems, work out what is missing, create it.

use anyhow::Context as _;

use crate::aggregate::{Product, Purchase, aggregate};
use crate::config::ReconcileConfig;
use crate::generate::{Generator, PendingVoucher, find_project};
use crate::reconcile::Matcher;
use crate::report::Report;
use crate::voucher::{Attachment, CostCenterItem, NewAttachment, Project, Voucher, VoucherAttachment};
use crate::window::DateWindow;
use crate::{Result, sorting};

/// Where sales come from.
pub trait SalesSource {
    fn purchases(&self, window: &DateWindow) -> Result<Vec<Purchase>>;
    fn products(&self) -> Result<Vec<Product>>;
    /// The receipt for one user and day, if iZettle has one.
    fn day_report_pdf(&self, report: &Report) -> Result<Option<Vec<u8>>>;
}

/// The accounting system vouchers are read from and written to.
pub trait Bookkeeping {
    fn vouchers(&self, window: &DateWindow) -> Result<Vec<Voucher>>;
    fn cost_centers(&self) -> Result<Vec<CostCenterItem>>;
    fn projects(&self) -> Result<Vec<Project>>;
    fn create_attachment(&mut self, attachment: NewAttachment) -> Result<Attachment>;
    fn create_voucher(&mut self, voucher: Voucher) -> Result<Voucher>;
}

/// What a pass would do, for review before anything is written.
#[derive(Debug, Default)]
pub struct SyncPlan {
    pub pending: Vec<PendingVoucher>,
    pub ignored: Vec<Report>,
    pub unmatched_vouchers: Vec<Voucher>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.ignored.is_empty() && self.unmatched_vouchers.is_empty()
    }
}

pub fn plan(
    sales: &impl SalesSource,
    books: &impl Bookkeeping,
    config: &ReconcileConfig,
    username_separator: &str,
    window: &DateWindow,
) -> Result<SyncPlan> {
    if window.is_empty() {
        tracing::info!(from = %window.from, to = %window.to, "date window is empty");
        return Ok(SyncPlan::default());
    }

    let products = sales.products().context("Failed to list products")?;
    let purchases = sales.purchases(window).context("Failed to list purchases")?;
    let mut reports = aggregate(&purchases, &products, config.other_income_account, username_separator)?;
    reports.retain(|report| window.contains(report.date));

    let mut vouchers = books.vouchers(window).context("Failed to list vouchers")?;
    vouchers.retain(|voucher| window.contains(voucher.date));
    sorting::sort_dedup_vouchers(&mut vouchers);

    let cost_centers = books.cost_centers().context("Failed to list cost centers")?;
    let projects = books.projects().context("Failed to list projects")?;
    let project = find_project(&projects, &config.uncategorized_project)?;
    tracing::info!(
        reports = reports.len(),
        vouchers = vouchers.len(),
        cost_centers = cost_centers.len(),
        "fetched"
    );

    let matcher = Matcher::new(config);
    let unmatched_vouchers = matcher.unmatched_vouchers(&reports, &vouchers, &cost_centers)?;
    let mut unmatched_reports = matcher.unmatched_reports(&reports, &vouchers, &cost_centers)?;

    for report in &mut unmatched_reports {
        if matcher.report_cost_center(report, &cost_centers).is_none() {
            continue;
        }
        let pdf = sales
            .day_report_pdf(report)
            .with_context(|| format!("Failed to fetch report PDF for {} {}", report.username, report.date))?;
        match pdf {
            Some(pdf) => report.attachments.push(pdf),
            None => tracing::warn!(user = %report.username, date = %report.date, "no PDF for report"),
        }
    }

    let generated = Generator::new(matcher).generate(unmatched_reports, &cost_centers, project)?;
    Ok(SyncPlan {
        pending: generated.pending,
        ignored: generated.ignored,
        unmatched_vouchers,
    })
}

#[derive(Debug, Default)]
pub struct UploadSummary {
    pub created: Vec<Voucher>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug)]
pub struct FailedUpload {
    pub pending: PendingVoucher,
    /// Uploaded before the failure and referenced by no voucher.
    pub orphaned_attachments: Vec<String>,
    pub error: anyhow::Error,
}

/// Creates every pending voucher. A failing voucher is reported and skipped.
pub fn upload(books: &mut impl Bookkeeping, pending: Vec<PendingVoucher>) -> UploadSummary {
    let mut summary = UploadSummary::default();
    for pending in pending {
        let mut uploaded = Vec::new();
        match upload_one(books, &pending, &mut uploaded) {
            Ok(created) => {
                tracing::info!(voucher = %created.label(), date = %created.date, user = %pending.username, "created voucher");
                summary.created.push(created);
            }
            Err(error) => {
                tracing::warn!(
                    date = %pending.voucher.date,
                    user = %pending.username,
                    orphaned_attachments = ?uploaded,
                    "failed to create voucher: {error:#}"
                );
                summary.failed.push(FailedUpload {
                    pending,
                    orphaned_attachments: uploaded,
                    error,
                });
            }
        }
    }
    summary
}

fn upload_one(
    books: &mut impl Bookkeeping,
    pending: &PendingVoucher,
    uploaded: &mut Vec<String>,
) -> Result<Voucher> {
    let mut voucher = pending.voucher.clone();

    for (index, contents) in pending.attachments.iter().enumerate() {
        let name = pending.attachment_name(index);
        let attachment = books
            .create_attachment(NewAttachment::pdf(&name, contents))
            .with_context(|| format!("Failed to upload attachment {name}"))?;
        uploaded.push(attachment.id);
    }
    if !uploaded.is_empty() {
        voucher.attachments = Some(VoucherAttachment {
            attachment_ids: uploaded.clone(),
        });
    }

    books.create_voucher(voucher).context("Failed to create voucher")
}
