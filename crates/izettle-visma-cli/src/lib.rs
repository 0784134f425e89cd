mod config;
mod show;
mod snapshot;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory as _, Parser, Subcommand};
use izettle_visma::sync;

use crate::config::{CONFIG_FILE_NAMES, Config};
use crate::show::Palette;
use crate::snapshot::SnapshotDir;

#[derive(Parser)]
#[command(
    name = "izettle-visma",
    about = "Books iZettle daily sales as vouchers in Visma eAccounting"
)]
#[command(disable_help_subcommand = true)]
struct Args {
    /// Config file. Defaults to izettle-visma.toml or .izettle-visma.toml in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the iZettle and Visma exports
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Reconcile as if run on this day
    #[arg(long)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Show what would be created and exit (default)
    Diff,
    /// Create the missing vouchers
    Sync {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "izettle_visma=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    execute(
        args,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &Palette::for_stdout(),
    )
}

fn execute(
    args: Args,
    input: &mut impl BufRead,
    out: &mut impl Write,
    palette: &Palette,
) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::find_in(Path::new("."))?.with_context(|| {
            format!("No config file found, expected one of {}", CONFIG_FILE_NAMES.join(", "))
        })?,
    };
    let snapshot_dir = args
        .snapshot
        .or_else(|| config.snapshot_dir().map(Path::to_path_buf))
        .context("No snapshot directory, pass --snapshot or set dir in the [snapshot] section")?;
    let mut snapshot = SnapshotDir::open(snapshot_dir)?;

    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let window = config.window(today);
    let reconcile = config.reconcile_config();
    tracing::info!(from = %window.from, to = %window.to, "reconciling");

    let plan = sync::plan(
        &snapshot,
        &snapshot,
        &reconcile,
        &config.users.separator,
        &window,
    )?;
    show::write_plan(out, &plan, palette)?;

    match args.command.unwrap_or(Commands::Diff) {
        Commands::Diff => Ok(()),
        Commands::Sync { yes } => {
            if plan.pending.is_empty() {
                return Ok(());
            }
            if !yes && !confirm(input, out, plan.pending.len())? {
                writeln!(out, "Nothing was created.")?;
                return Ok(());
            }

            let total = plan.pending.len();
            let summary = sync::upload(&mut snapshot, plan.pending);
            show::write_upload(out, &summary, palette)?;
            if !summary.failed.is_empty() {
                anyhow::bail!("{} of {total} voucher(s) failed to upload", summary.failed.len());
            }
            Ok(())
        }
    }
}

fn confirm(input: &mut impl BufRead, out: &mut impl Write, count: usize) -> Result<bool> {
    write!(out, "Create {count} voucher(s)? [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[accounts]
ledger = 1690
bank = [1930]
other_income = 3110

[window]
from = "2021-03-01"

[users]
mappings = [["Zenith", "Zenith"], ["ZIK", "ZIK"]]

[snapshot]
dir = "export"
"#;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("izettle-visma.toml"), CONFIG).unwrap();
        let export = dir.path().join("export");
        std::fs::create_dir(&export).unwrap();
        snapshot::tests::write_snapshot(&export);
        dir
    }

    fn invoke(dir: &Path, extra: &[&str], input: &str) -> (Result<()>, String) {
        let config = dir.join("izettle-visma.toml");
        let mut argv = vec![
            "izettle-visma".to_owned(),
            "--config".to_owned(),
            config.display().to_string(),
            "--today".to_owned(),
            "2021-03-10".to_owned(),
        ];
        argv.extend(extra.iter().map(|arg| arg.to_string()));
        let args = Args::try_parse_from(argv).unwrap();

        let mut out = Vec::new();
        let result = execute(args, &mut input.as_bytes(), &mut out, &Palette::plain());
        (result, String::from_utf8(out).unwrap())
    }

    fn outbox_vouchers(dir: &Path) -> usize {
        let outbox = dir.join("export").join("outbox").join("vouchers");
        std::fs::read_dir(outbox).map_or(0, |entries| entries.count())
    }

    #[test]
    fn diff_writes_nothing() {
        let dir = setup();

        let (result, out) = invoke(dir.path(), &["diff"], "");

        result.unwrap();
        assert!(out.contains("━━━ New voucher (Zenith) ━━━"), "{out}");
        assert!(out.contains("1 voucher(s) to create"), "{out}");
        assert_eq!(outbox_vouchers(dir.path()), 0);
    }

    #[test]
    fn sync_declined() {
        let dir = setup();

        let (result, out) = invoke(dir.path(), &["sync"], "n\n");

        result.unwrap();
        assert!(out.ends_with("Create 1 voucher(s)? [y/N] Nothing was created.\n"), "{out}");
        assert_eq!(outbox_vouchers(dir.path()), 0);
    }

    #[test]
    fn sync_confirmed_then_in_sync() {
        let dir = setup();

        let (result, out) = invoke(dir.path(), &["sync"], "y\n");
        result.unwrap();
        assert!(out.ends_with("✓ created O1 for 2021-03-01\n"), "{out}");
        assert_eq!(outbox_vouchers(dir.path()), 1);

        let (result, out) = invoke(dir.path(), &["sync", "--yes"], "");
        result.unwrap();
        insta::assert_snapshot!(out, @"✓ Everything is in sync!");
        assert_eq!(outbox_vouchers(dir.path()), 1);
    }

    #[test]
    fn snapshot_flag_overrides_config() {
        let dir = setup();
        let empty = dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();

        let (result, _) = invoke(dir.path(), &["--snapshot", empty.to_str().unwrap(), "diff"], "");

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("products.json"), "{err:#}");
    }

    #[test]
    fn confirm_answers() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("\n", false), ("nope\n", false)] {
            let mut out = Vec::new();
            assert_eq!(confirm(&mut answer.as_bytes(), &mut out, 2).unwrap(), expected);
            assert_eq!(String::from_utf8(out).unwrap(), "Create 2 voucher(s)? [y/N] ");
        }
    }
}
