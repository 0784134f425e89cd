use crate::report::Report;
use crate::voucher::Voucher;

/// Stable: reports on the same day keep their relative order.
pub fn sort_reports(reports: &mut [Report]) {
    reports.sort_by_key(|report| report.date);
}

pub fn sort_dedup_vouchers(vouchers: &mut Vec<Voucher>) {
    vouchers.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    vouchers.dedup_by(|a, b| is_identical(a, b));
}

// The same voucher fetched twice, e.g. from overlapping fiscal years
fn is_identical(a: &Voucher, b: &Voucher) -> bool {
    a.id.is_some() && a.id == b.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voucher::VoucherRow;
    use rust_decimal_macros::dec;

    fn voucher(id: Option<&str>, date: &str) -> Voucher {
        let mut voucher = Voucher::new(
            date.parse().unwrap(),
            "",
            vec![VoucherRow::debit(1690, dec!(1))],
        );
        voucher.id = id.map(ToOwned::to_owned);
        voucher
    }

    #[test]
    fn dedup_keeps_vouchers_without_id() {
        let mut vouchers = vec![
            voucher(Some("b"), "2021-03-02"),
            voucher(None, "2021-03-01"),
            voucher(Some("a"), "2021-03-01"),
            voucher(Some("b"), "2021-03-02"),
            voucher(None, "2021-03-01"),
        ];

        sort_dedup_vouchers(&mut vouchers);

        let ids: Vec<_> = vouchers.iter().map(|v| v.id.as_deref()).collect();
        assert_eq!(ids, vec![None, None, Some("a"), Some("b")]);
    }
}
