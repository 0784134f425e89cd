use std::collections::BTreeSet;

use crate::error::{ReconcileError, ReconcileResult};

pub const DEFAULT_VOUCHER_TEXT: &str = "Uncategorized iZettle Import";

/// Pairs a (normalized) iZettle username with a Visma cost center short name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMapping {
    pub izettle: String,
    pub visma: String,
}

impl UserMapping {
    pub fn new(izettle: impl Into<String>, visma: impl Into<String>) -> Self {
        UserMapping {
            izettle: izettle.into(),
            visma: visma.into(),
        }
    }
}

/// A validated set of user mappings. Every iZettle user maps to at most one cost center.
#[derive(Debug, Clone, Default)]
pub struct UserMappings(Vec<UserMapping>);

impl UserMappings {
    pub fn new(mappings: Vec<UserMapping>) -> ReconcileResult<Self> {
        let mut seen = BTreeSet::new();
        for mapping in &mappings {
            if !seen.insert(mapping.izettle.as_str()) {
                return Err(ReconcileError::DuplicateUserMapping {
                    username: mapping.izettle.clone(),
                });
            }
        }
        Ok(UserMappings(mappings))
    }

    pub fn contains(&self, izettle: &str, visma: &str) -> bool {
        self.0
            .iter()
            .any(|mapping| mapping.izettle == izettle && mapping.visma == visma)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserMapping> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the matcher and generator need to know about the books.
/// Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Clearing account iZettle sales are booked against before categorization.
    pub ledger_account: u32,
    /// Vouchers touching any of these are bank settlements, not sales.
    pub bank_accounts: BTreeSet<u32>,
    /// Account for products missing from the catalog.
    pub other_income_account: u32,
    /// Number of the project new vouchers are tagged with.
    pub uncategorized_project: String,
    pub voucher_text: String,
    pub user_mappings: UserMappings,
}

impl ReconcileConfig {
    pub fn new(ledger_account: u32, other_income_account: u32, user_mappings: UserMappings) -> Self {
        ReconcileConfig {
            ledger_account,
            bank_accounts: BTreeSet::new(),
            other_income_account,
            uncategorized_project: "1".to_owned(),
            voucher_text: DEFAULT_VOUCHER_TEXT.to_owned(),
            user_mappings,
        }
    }

    pub fn with_bank_accounts(mut self, accounts: impl IntoIterator<Item = u32>) -> Self {
        self.bank_accounts = accounts.into_iter().collect();
        self
    }

    pub fn with_uncategorized_project(mut self, number: impl Into<String>) -> Self {
        self.uncategorized_project = number.into();
        self
    }

    pub fn with_voucher_text(mut self, text: impl Into<String>) -> Self {
        self.voucher_text = text.into();
        self
    }
}
