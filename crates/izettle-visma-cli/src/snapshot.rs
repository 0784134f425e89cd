//! Sales and bookkeeping read from a directory of JSON exports.
//!
//! Anything created is written to `outbox/` next to the exports and read
//! back by later runs, so the directory behaves like the real systems.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use izettle_visma::aggregate::{Product, Purchase};
use izettle_visma::sync::{Bookkeeping, SalesSource};
use izettle_visma::voucher::{Attachment, NewAttachment};
use izettle_visma::{CostCenterItem, DateWindow, Project, Report, Voucher, VoucherType};
use serde::Serialize;
use serde::de::DeserializeOwned;

const VOUCHERS: &str = "vouchers";
const ATTACHMENTS: &str = "attachments";

pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            anyhow::bail!("Snapshot directory {} does not exist", root.display());
        }
        Ok(SnapshotDir { root })
    }

    pub fn outbox_dir(&self, kind: &str) -> PathBuf {
        self.root.join("outbox").join(kind)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn outbox_entries(&self, kind: &str) -> Result<Vec<PathBuf>> {
        let dir = self.outbox_dir(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                entries.push(path);
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn write_outbox<T: Serialize>(&self, kind: &str, index: usize, value: &T) -> Result<()> {
        let dir = self.outbox_dir(kind);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("{index:04}.json"));
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl SalesSource for SnapshotDir {
    fn purchases(&self, window: &DateWindow) -> Result<Vec<Purchase>> {
        let mut purchases: Vec<Purchase> = Self::read_json(&self.root.join("purchases.json"))?;
        purchases.retain(|purchase| window.contains(purchase.date()));
        Ok(purchases)
    }

    fn products(&self) -> Result<Vec<Product>> {
        Self::read_json(&self.root.join("products.json"))
    }

    fn day_report_pdf(&self, report: &Report) -> Result<Option<Vec<u8>>> {
        let path = self.root.join("pdfs").join(report.attachment_name());
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }
}

impl Bookkeeping for SnapshotDir {
    fn vouchers(&self, window: &DateWindow) -> Result<Vec<Voucher>> {
        let mut vouchers: Vec<Voucher> = Self::read_json(&self.root.join("vouchers.json"))?;
        for path in self.outbox_entries(VOUCHERS)? {
            vouchers.push(Self::read_json(&path)?);
        }
        vouchers.retain(|voucher| window.contains(voucher.date));
        Ok(vouchers)
    }

    fn cost_centers(&self) -> Result<Vec<CostCenterItem>> {
        Self::read_json(&self.root.join("cost_centers.json"))
    }

    fn projects(&self) -> Result<Vec<Project>> {
        Self::read_json(&self.root.join("projects.json"))
    }

    fn create_attachment(&mut self, attachment: NewAttachment) -> Result<Attachment> {
        let index = self.outbox_entries(ATTACHMENTS)?.len() + 1;
        self.write_outbox(ATTACHMENTS, index, &attachment)?;
        Ok(Attachment {
            id: format!("outbox-attachment-{index}"),
            file_name: attachment.file_name,
        })
    }

    fn create_voucher(&mut self, mut voucher: Voucher) -> Result<Voucher> {
        let index = self.outbox_entries(VOUCHERS)?.len() + 1;
        voucher.id = Some(format!("outbox-{index}"));
        voucher.number = Some(format!("O{index}"));
        // stands in for the import, so later runs treat it like one
        voucher.voucher_type = Some(VoucherType::SieImport);
        self.write_outbox(VOUCHERS, index, &voucher)?;
        Ok(voucher)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use izettle_visma::sync::{plan, upload};
    use izettle_visma::{ReconcileConfig, UserMapping, UserMappings};
    use rust_decimal_macros::dec;

    const PURCHASES: &str = r#"[
        {
            "timestamp": "2021-03-01T10:15:00+01:00",
            "userId": 1,
            "userDisplayName": "Zenith .",
            "products": [
                {"variantUuid": "v-coffee", "name": "Kaffe", "quantity": 2, "unitPrice": 1000},
                {"variantUuid": "v-unknown", "name": "Sticker", "quantity": 1, "unitPrice": 500}
            ]
        },
        {
            "timestamp": "2021-03-02T18:00:00+01:00",
            "userId": 2,
            "userDisplayName": "ZIK .",
            "products": [
                {"variantUuid": "v-coffee", "name": "Kaffe", "quantity": 1, "unitPrice": 1000}
            ]
        },
        {
            "timestamp": "2021-03-20T18:00:00+01:00",
            "userId": 2,
            "userDisplayName": "ZIK .",
            "products": [
                {"variantUuid": "v-coffee", "name": "Kaffe", "quantity": 1, "unitPrice": 1000}
            ]
        }
    ]"#;

    const PRODUCTS: &str = r#"[
        {"uuid": "p-coffee", "name": "Kaffe", "variants": [{"uuid": "v-coffee", "barcode": "3001"}]}
    ]"#;

    const VOUCHERS_JSON: &str = r#"[
        {
            "Id": "v-1",
            "VoucherDate": "2021-03-02",
            "VoucherText": "iZettle ZIK",
            "NumberAndNumberSeries": "A1",
            "VoucherType": 9,
            "Rows": [
                {"AccountNumber": 1690, "DebitAmount": 10, "CostCenterItemId1": "cc-zik"},
                {"AccountNumber": 3001, "CreditAmount": 10, "CostCenterItemId1": "cc-zik"}
            ]
        },
        {
            "Id": "v-2",
            "VoucherDate": "2021-03-03",
            "VoucherText": "Settlement",
            "VoucherType": 10,
            "Rows": [
                {"AccountNumber": 1930, "DebitAmount": 35},
                {"AccountNumber": 1690, "CreditAmount": 35}
            ]
        }
    ]"#;

    const COST_CENTERS: &str = r#"[
        {"Id": "cc-zenith", "ShortName": "Zenith", "Name": "Zenith"},
        {"Id": "cc-zik", "ShortName": "ZIK", "Name": "ZIK"}
    ]"#;

    const PROJECTS: &str = r#"[{"Id": "proj-1", "Number": "1", "Name": "Okategoriserat"}]"#;

    pub(crate) fn write_snapshot(root: &Path) {
        std::fs::write(root.join("purchases.json"), PURCHASES).unwrap();
        std::fs::write(root.join("products.json"), PRODUCTS).unwrap();
        std::fs::write(root.join("vouchers.json"), VOUCHERS_JSON).unwrap();
        std::fs::write(root.join("cost_centers.json"), COST_CENTERS).unwrap();
        std::fs::write(root.join("projects.json"), PROJECTS).unwrap();
        std::fs::create_dir(root.join("pdfs")).unwrap();
        std::fs::write(root.join("pdfs").join("Zenith_2021-03-01.pdf"), b"%PDF-1.4").unwrap();
    }

    fn config() -> ReconcileConfig {
        let mappings = UserMappings::new(vec![
            UserMapping::new("Zenith", "Zenith"),
            UserMapping::new("ZIK", "ZIK"),
        ])
        .unwrap();
        ReconcileConfig::new(1690, 3110, mappings).with_bank_accounts([1930])
    }

    fn window() -> DateWindow {
        DateWindow::with_lag("2021-03-01".parse().unwrap(), "2021-03-10".parse().unwrap(), 2)
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(SnapshotDir::open(dir.path().join("nope")).is_err());
    }

    #[test]
    fn reads_exports_within_window() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        let snapshot = SnapshotDir::open(dir.path()).unwrap();

        let purchases = snapshot.purchases(&window()).unwrap();
        assert_eq!(purchases.len(), 2);
        assert_eq!(snapshot.vouchers(&window()).unwrap().len(), 2);
        assert_eq!(snapshot.cost_centers().unwrap()[1].short_name, "ZIK");
        assert_eq!(snapshot.projects().unwrap()[0].number, "1");
    }

    #[test]
    fn pdf_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        let snapshot = SnapshotDir::open(dir.path()).unwrap();
        let date = "2021-03-01".parse().unwrap();

        let zenith = Report::new(date, "1", "Zenith", Vec::new());
        let zik = Report::new(date, "2", "ZIK", Vec::new());

        assert_eq!(
            snapshot.day_report_pdf(&zenith).unwrap(),
            Some(b"%PDF-1.4".to_vec())
        );
        assert_eq!(snapshot.day_report_pdf(&zik).unwrap(), None);
    }

    #[test]
    fn broken_export_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        std::fs::write(dir.path().join("projects.json"), "{").unwrap();
        let snapshot = SnapshotDir::open(dir.path()).unwrap();

        let err = snapshot.projects().unwrap_err();

        assert!(err.to_string().contains("projects.json"), "{err}");
    }

    #[test]
    fn sync_writes_outbox_and_second_run_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        let config = config();
        let mut snapshot = SnapshotDir::open(dir.path()).unwrap();

        let first = plan(&snapshot, &snapshot, &config, ".", &window()).unwrap();
        assert_eq!(first.pending.len(), 1);
        let pending = &first.pending[0];
        assert_eq!(pending.username, "Zenith");
        assert_eq!(pending.voucher.debit_total(), dec!(25.00));
        assert_eq!(pending.attachments.len(), 1);

        let summary = upload(&mut snapshot, first.pending);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.created[0].label(), "O1");
        assert!(snapshot.outbox_dir(VOUCHERS).join("0001.json").exists());
        assert!(snapshot.outbox_dir(ATTACHMENTS).join("0001.json").exists());

        let second = plan(&snapshot, &snapshot, &config, ".", &window()).unwrap();
        assert!(second.is_empty(), "{second:?}");
    }
}
