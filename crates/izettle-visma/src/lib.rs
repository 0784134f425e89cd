pub mod aggregate;
pub mod config;
pub mod error;
pub mod generate;
pub mod reconcile;
pub mod report;
mod sorting;
pub mod sync;
pub mod voucher;
pub mod window;

#[cfg(test)]
mod fixtures;

pub type Decimal = rust_decimal::Decimal;

pub use anyhow::Result;

pub use config::{ReconcileConfig, UserMapping, UserMappings};
pub use error::ReconcileError;
pub use generate::{Generator, PendingVoucher};
pub use reconcile::Matcher;
pub use report::{Report, ReportRow};
pub use voucher::{CostCenterItem, Project, Voucher, VoucherRow, VoucherType};
pub use window::DateWindow;
