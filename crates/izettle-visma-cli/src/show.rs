use std::io::{self, Write};

use anstyle::{AnsiColor, Color, Style};
use izettle_visma::sync::{SyncPlan, UploadSummary};

pub struct Palette {
    pub pending: Style,
    pub ignored: Style,
    pub review: Style,
    pub bold: Style,
}

impl Palette {
    pub fn colored() -> Self {
        Palette {
            pending: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
            ignored: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
            review: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))),
            bold: Style::new().bold(),
        }
    }

    pub fn plain() -> Self {
        Palette {
            pending: Style::new(),
            ignored: Style::new(),
            review: Style::new(),
            bold: Style::new(),
        }
    }

    pub fn for_stdout() -> Self {
        use std::io::IsTerminal as _;
        if io::stdout().is_terminal() {
            Palette::colored()
        } else {
            Palette::plain()
        }
    }
}

pub fn write_plan(out: &mut impl Write, plan: &SyncPlan, palette: &Palette) -> io::Result<()> {
    let Palette {
        pending,
        ignored,
        review,
        bold,
    } = palette;

    for voucher in &plan.pending {
        writeln!(out, "{pending}━━━ New voucher ({}) ━━━{pending:#}", voucher.username)?;
        write!(out, "{voucher}")?;
        writeln!(out)?;
    }

    for report in &plan.ignored {
        writeln!(out, "{ignored}━━━ Ignored (no cost center for user) ━━━{ignored:#}")?;
        write!(out, "{report}")?;
        writeln!(out)?;
    }

    for voucher in &plan.unmatched_vouchers {
        writeln!(out, "{review}━━━ Imported voucher without a report (needs review) ━━━{review:#}")?;
        write!(out, "{voucher}")?;
        writeln!(out)?;
    }

    if plan.is_empty() {
        writeln!(out, "✓ Everything is in sync!")?;
        return Ok(());
    }

    writeln!(out, "{bold}━━━ Summary ━━━{bold:#}")?;
    if !plan.pending.is_empty() {
        let count = plan.pending.len();
        writeln!(out, "  {pending}{count}{pending:#} voucher(s) to create")?;
    }
    if !plan.ignored.is_empty() {
        let count = plan.ignored.len();
        writeln!(out, "  {ignored}{count}{ignored:#} report(s) ignored")?;
    }
    if !plan.unmatched_vouchers.is_empty() {
        let count = plan.unmatched_vouchers.len();
        writeln!(out, "  {review}{count}{review:#} voucher(s) need manual review")?;
    }
    Ok(())
}

pub fn write_upload(out: &mut impl Write, summary: &UploadSummary, palette: &Palette) -> io::Result<()> {
    let Palette {
        pending, review, ..
    } = palette;

    for voucher in &summary.created {
        writeln!(out, "{pending}✓{pending:#} created {} for {}", voucher.label(), voucher.date)?;
    }
    for failed in &summary.failed {
        writeln!(
            out,
            "{review}✗{review:#} {} {}: {:#}",
            failed.pending.voucher.date, failed.pending.username, failed.error
        )?;
        if !failed.orphaned_attachments.is_empty() {
            writeln!(
                out,
                "  unreferenced attachment(s): {}",
                failed.orphaned_attachments.join(", ")
            )?;
        }
    }
    Ok(())
}
