//! Turning raw iZettle purchases into per-user daily reports.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Decimal;
use crate::error::{ReconcileError, ReconcileResult};
use crate::report::{Report, ReportRow, normalize_username};

pub const CUSTOM_PRODUCT: &str = "Custom product";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseProduct {
    pub variant_uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variant_name: String,
    pub quantity: i64,
    /// Price per unit in minor units (öre).
    pub unit_price: i64,
}

impl PurchaseProduct {
    pub fn amount(&self) -> ReconcileResult<Decimal> {
        Decimal::from(self.quantity)
            .checked_mul(Decimal::new(self.unit_price, 2))
            .ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> ReconcileError {
        ReconcileError::AmountOverflow {
            product: if self.name.is_empty() {
                self.variant_uuid.clone()
            } else {
                self.name.clone()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub timestamp: DateTime<FixedOffset>,
    pub user_id: i64,
    pub user_display_name: String,
    pub products: Vec<PurchaseProduct>,
}

impl Purchase {
    /// The calendar day of the sale, in the offset it was recorded in.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    /// Carries the Visma account number for the variant.
    #[serde(default)]
    pub barcode: String,
}

impl Variant {
    pub fn account(&self) -> Option<u32> {
        self.barcode.trim().parse().ok().filter(|&account| account != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn find_variant<'a>(uuid: &str, products: &'a [Product]) -> Option<(&'a Product, &'a Variant)> {
    products.iter().find_map(|product| {
        product
            .variants
            .iter()
            .find(|variant| variant.uuid == uuid)
            .map(|variant| (product, variant))
    })
}

#[derive(Default)]
struct VariantSummary {
    quantity: i64,
    amount: Decimal,
}

struct Group<'a> {
    date: NaiveDate,
    user_key: String,
    display_name: &'a str,
    // keeps first-seen order of variants
    variants: Vec<(&'a str, VariantSummary)>,
}

/// Builds one report per (day, user), sorted by day.
///
/// Variants missing from the catalog are booked on `default_account` as a
/// custom product. Purchases without line items produce no report.
pub fn aggregate(
    purchases: &[Purchase],
    products: &[Product],
    default_account: u32,
    username_separator: &str,
) -> ReconcileResult<Vec<Report>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut index: HashMap<(NaiveDate, i64), usize> = HashMap::new();

    for purchase in purchases {
        if purchase.products.is_empty() {
            tracing::debug!(user = %purchase.user_display_name, timestamp = %purchase.timestamp, "skipping purchase without products");
            continue;
        }
        let key = (purchase.date(), purchase.user_id);
        let at = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                date: key.0,
                user_key: purchase.user_id.to_string(),
                display_name: &purchase.user_display_name,
                variants: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[at];

        for item in &purchase.products {
            let position = group
                .variants
                .iter()
                .position(|(uuid, _)| *uuid == item.variant_uuid);
            let position = match position {
                Some(position) => position,
                None => {
                    group
                        .variants
                        .push((item.variant_uuid.as_str(), VariantSummary::default()));
                    group.variants.len() - 1
                }
            };
            let summary = &mut group.variants[position].1;
            summary.quantity = summary
                .quantity
                .checked_add(item.quantity)
                .ok_or_else(|| item.overflow())?;
            summary.amount = summary
                .amount
                .checked_add(item.amount()?)
                .ok_or_else(|| item.overflow())?;
        }
    }

    let mut reports: Vec<Report> = groups
        .into_iter()
        .map(|group| {
            let rows = group
                .variants
                .into_iter()
                .map(|(uuid, summary)| report_row(uuid, summary, products, default_account))
                .collect();
            Report::new(
                group.date,
                group.user_key,
                normalize_username(group.display_name, username_separator),
                rows,
            )
        })
        .collect();

    crate::sorting::sort_reports(&mut reports);
    tracing::debug!(
        purchases = purchases.len(),
        reports = reports.len(),
        "aggregated purchases"
    );
    Ok(reports)
}

fn report_row(
    uuid: &str,
    summary: VariantSummary,
    products: &[Product],
    default_account: u32,
) -> ReportRow {
    match find_variant(uuid, products) {
        Some((product, variant)) => {
            let product_name = if variant.name.is_empty() {
                product.name.clone()
            } else {
                format!("{}, {}", product.name, variant.name)
            };
            ReportRow {
                product: product_name,
                quantity: summary.quantity,
                amount: summary.amount,
                account: variant.account(),
            }
        }
        None => ReportRow {
            product: CUSTOM_PRODUCT.to_owned(),
            quantity: summary.quantity,
            amount: summary.amount,
            account: Some(default_account),
        },
    }
}
