//! The Visma eAccounting side: vouchers, cost centers and projects.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Decimal;

/// Kind of voucher as reported by Visma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum VoucherType {
    Manual,
    BankAccountTransferDeposit,
    BankAccountTransferWithdrawal,
    PurchaseReceipt,
    VatReport,
    /// Created by an importer. Only these are expected to mirror a report one to one.
    SieImport,
    BankTransactionDeposit,
    BankTransactionWithdrawal,
    SupplierInvoiceDebit,
    SupplierInvoiceCredit,
    CustomerInvoiceDebit,
    CustomerInvoiceCredit,
    ClaimOnCardAcquirer,
    TaxReturn,
    AllocationPeriod,
    AllocationPeriodCorrection,
    InventoryEvent,
    EmployerReport,
    Payslip,
    CustomerQuickInvoiceDebit,
    CustomerQuickInvoiceCredit,
    SupplierQuickInvoiceDebit,
    SupplierQuickInvoiceCredit,
    IZettle,
    Other(u8),
}

impl From<u8> for VoucherType {
    fn from(value: u8) -> Self {
        match value {
            2 => VoucherType::Manual,
            5 => VoucherType::BankAccountTransferDeposit,
            6 => VoucherType::BankAccountTransferWithdrawal,
            7 => VoucherType::PurchaseReceipt,
            8 => VoucherType::VatReport,
            9 => VoucherType::SieImport,
            10 => VoucherType::BankTransactionDeposit,
            11 => VoucherType::BankTransactionWithdrawal,
            12 => VoucherType::SupplierInvoiceDebit,
            13 => VoucherType::SupplierInvoiceCredit,
            14 => VoucherType::CustomerInvoiceDebit,
            15 => VoucherType::CustomerInvoiceCredit,
            16 => VoucherType::ClaimOnCardAcquirer,
            17 => VoucherType::TaxReturn,
            18 => VoucherType::AllocationPeriod,
            19 => VoucherType::AllocationPeriodCorrection,
            20 => VoucherType::InventoryEvent,
            21 => VoucherType::EmployerReport,
            22 => VoucherType::Payslip,
            23 => VoucherType::CustomerQuickInvoiceDebit,
            24 => VoucherType::CustomerQuickInvoiceCredit,
            25 => VoucherType::SupplierQuickInvoiceDebit,
            26 => VoucherType::SupplierQuickInvoiceCredit,
            27 => VoucherType::IZettle,
            other => VoucherType::Other(other),
        }
    }
}

impl From<VoucherType> for u8 {
    fn from(value: VoucherType) -> Self {
        match value {
            VoucherType::Manual => 2,
            VoucherType::BankAccountTransferDeposit => 5,
            VoucherType::BankAccountTransferWithdrawal => 6,
            VoucherType::PurchaseReceipt => 7,
            VoucherType::VatReport => 8,
            VoucherType::SieImport => 9,
            VoucherType::BankTransactionDeposit => 10,
            VoucherType::BankTransactionWithdrawal => 11,
            VoucherType::SupplierInvoiceDebit => 12,
            VoucherType::SupplierInvoiceCredit => 13,
            VoucherType::CustomerInvoiceDebit => 14,
            VoucherType::CustomerInvoiceCredit => 15,
            VoucherType::ClaimOnCardAcquirer => 16,
            VoucherType::TaxReturn => 17,
            VoucherType::AllocationPeriod => 18,
            VoucherType::AllocationPeriodCorrection => 19,
            VoucherType::InventoryEvent => 20,
            VoucherType::EmployerReport => 21,
            VoucherType::Payslip => 22,
            VoucherType::CustomerQuickInvoiceDebit => 23,
            VoucherType::CustomerQuickInvoiceCredit => 24,
            VoucherType::SupplierQuickInvoiceDebit => 25,
            VoucherType::SupplierQuickInvoiceCredit => 26,
            VoucherType::IZettle => 27,
            VoucherType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoucherRow {
    pub account_number: u32,
    #[serde(default)]
    pub debit_amount: Decimal,
    #[serde(default)]
    pub credit_amount: Decimal,
    #[serde(
        default,
        rename = "CostCenterItemId1",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_center_item_id1: Option<String>,
    #[serde(default, rename = "ProjectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl VoucherRow {
    pub fn debit(account_number: u32, amount: Decimal) -> Self {
        VoucherRow {
            account_number,
            debit_amount: amount,
            ..Default::default()
        }
    }

    pub fn credit(account_number: u32, amount: Decimal) -> Self {
        VoucherRow {
            account_number,
            credit_amount: amount,
            ..Default::default()
        }
    }

    pub fn with_cost_center(mut self, id: impl Into<String>) -> Self {
        self.cost_center_item_id1 = Some(id.into());
        self
    }

    pub fn with_project(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoucherAttachment {
    pub attachment_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Voucher {
    #[serde(default, rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "VoucherDate")]
    pub date: NaiveDate,
    #[serde(default, rename = "VoucherText")]
    pub text: String,
    pub rows: Vec<VoucherRow>,
    #[serde(
        default,
        rename = "NumberAndNumberSeries",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<String>,
    /// Assigned by Visma, absent on vouchers that have not been created yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_type: Option<VoucherType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<VoucherAttachment>,
}

impl Voucher {
    pub fn new(date: NaiveDate, text: impl Into<String>, rows: Vec<VoucherRow>) -> Self {
        Voucher {
            id: None,
            date,
            text: text.into(),
            rows,
            number: None,
            voucher_type: None,
            attachments: None,
        }
    }

    /// Something to identify the voucher by in messages, even before it has an id.
    pub fn label(&self) -> String {
        match (&self.number, &self.id) {
            (Some(number), _) => number.clone(),
            (None, Some(id)) => id.clone(),
            (None, None) => format!("<new {}>", self.date),
        }
    }

    pub fn is_import(&self) -> bool {
        self.voucher_type == Some(VoucherType::SieImport)
    }

    pub fn debit_total(&self) -> Decimal {
        self.rows.iter().map(|row| row.debit_amount).sum()
    }

    pub fn credit_total(&self) -> Decimal {
        self.rows.iter().map(|row| row.credit_amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }
}

impl fmt::Display for Voucher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} \"{}\"", self.date, self.label(), self.text)?;
        for row in &self.rows {
            write!(f, "  {}", row.account_number)?;
            if !row.debit_amount.is_zero() {
                write!(f, "\tdebit {}", row.debit_amount)?;
            }
            if !row.credit_amount.is_zero() {
                write!(f, "\tcredit {}", row.credit_amount)?;
            }
            if let Some(cost_center) = &row.cost_center_item_id1 {
                write!(f, "\tcc:{cost_center}")?;
            }
            if let Some(project) = &row.project_id {
                write!(f, "\tproject:{project}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostCenterItem {
    #[serde(rename = "Id")]
    pub id: String,
    pub short_name: String,
    pub name: String,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(rename = "Id")]
    pub id: String,
    pub number: String,
    #[serde(default)]
    pub name: String,
}

/// A file to upload before it is referenced from a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewAttachment {
    pub file_name: String,
    pub content_type: String,
    /// Base64 encoded file contents.
    pub data: String,
}

impl NewAttachment {
    pub fn pdf(file_name: impl Into<String>, contents: &[u8]) -> Self {
        use base64::Engine as _;

        NewAttachment {
            file_name: file_name.into(),
            content_type: "application/pdf".to_owned(),
            data: base64::engine::general_purpose::STANDARD.encode(contents),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    #[serde(rename = "Id")]
    pub id: String,
    pub file_name: String,
}
