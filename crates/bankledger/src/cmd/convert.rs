//! bank-csv-to-ledger - Convert a bank CSV export into ledger entries.
//!
//! Each transaction is matched against a rule file; the first matching rule
//! decides how the amount is allocated to other accounts.
//!
//! # Usage
//!
//! ```bash
//! bank-csv-to-ledger statement.csv Assets:Current
//! bank-csv-to-ledger -f 'Date,Junk,Desc,PaidIn,PaidOut,Balance' -I statement.csv Assets:Current
//! bank-csv-to-ledger --config nationwide.json statement.csv Assets:Current
//! ```

use crate::cmd::completions::ShellType;
use crate::output;
use crate::report;
use anyhow::{Context, Result};
use bankledger_core::{
    classify, skeleton_rules, sort_by_date, FixedSign, RenderOptions, RuleSet, Summary, TaxMode,
};
use bankledger_importer::{CsvConfig, CsvConfigBuilder};
use bankledger_rules::LoadError;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const INPUT_FORMAT_HELP: &str = "\
INPUT FORMAT:
  The input format lists the CSV columns, split by the delimiter:

    -f 'Date,Junk,Desc,PaidIn,PaidOut,Balance'
    -f 'Date,Desc,Amount'

  Date     the transaction date
  Desc     the description
  Amount   a signed amount, negative for money going out
  PaidIn   money coming in
  PaidOut  money going out
  Balance  the running balance (ignored)

  Any other name marks a column to ignore. Date and Desc are required,
  plus either Amount or both PaidIn and PaidOut.";

/// Percentage tax semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaxModeArg {
    /// Tax is added on top of the allocated amount
    Exclusive,
    /// Tax is included in the allocated amount
    Inclusive,
}

impl From<TaxModeArg> for TaxMode {
    fn from(arg: TaxModeArg) -> Self {
        match arg {
            TaxModeArg::Exclusive => Self::Exclusive,
            TaxModeArg::Inclusive => Self::Inclusive,
        }
    }
}

/// Sign of fixed allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FixedSignArg {
    /// A fixed `30` posts `-30.00`
    AsWritten,
    /// A fixed `30` posts `30.00`
    Inverted,
}

impl From<FixedSignArg> for FixedSign {
    fn from(arg: FixedSignArg) -> Self {
        match arg {
            FixedSignArg::AsWritten => Self::AsWritten,
            FixedSignArg::Inverted => Self::Inverted,
        }
    }
}

/// Convert a bank CSV export into ledger entries using match rules.
#[derive(Parser, Debug)]
#[command(name = "bank-csv-to-ledger")]
#[command(author, version, about, long_about = None, after_help = INPUT_FORMAT_HELP)]
pub struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// The bank CSV export
    #[arg(
        value_name = "CSV_FILE",
        required_unless_present_any = ["generate_completions", "list_rules"]
    )]
    pub csv_file: Option<PathBuf>,

    /// The account the transactions belong to
    #[arg(
        value_name = "ACCOUNT",
        required_unless_present_any = ["generate_completions", "list_rules"]
    )]
    pub account: Option<String>,

    /// Rule file (default: ~/.bank-csv-to-ledger/rules.txt)
    #[arg(short = 'r', long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Date format, e.g. D/M/Y, Y-M-D or 'D M Y' (default: D/M/Y)
    #[arg(short = 'D', long, value_name = "TEMPLATE")]
    pub date_format: Option<String>,

    /// Input format (default: Date,Desc,Amount)
    #[arg(short = 'f', long, value_name = "LAYOUT")]
    pub input_format: Option<String>,

    /// Field delimiter (default: ,)
    #[arg(short = 'd', long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Ignore the first line of the CSV file
    #[arg(short = 'I', long)]
    pub ignore_first_line: bool,

    /// Print unmatched transactions only
    #[arg(short = 'u', long, conflicts_with = "unmatched_as_rules")]
    pub unmatched: bool,

    /// Print unmatched transactions as skeleton rules
    #[arg(short = 'U', long)]
    pub unmatched_as_rules: bool,

    /// Print the parsed rules and exit
    #[arg(long)]
    pub list_rules: bool,

    /// How percentage tax rates are applied
    #[arg(long, value_enum)]
    pub tax_mode: Option<TaxModeArg>,

    /// Sign of fixed allocations
    #[arg(long, value_enum)]
    pub fixed_sign: Option<FixedSignArg>,

    /// Abort on the first malformed row instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Strip surrounding whitespace from descriptions
    #[arg(long)]
    pub trim_description: bool,

    /// JSON import profile
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Don't print the summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// A JSON import profile: CSV settings plus allocation semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// How to read the CSV file.
    #[serde(flatten)]
    pub csv: CsvConfig,
    /// Allocation semantics.
    #[serde(flatten)]
    pub render: RenderOptions,
}

impl Profile {
    /// Read a profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Main entry point for the convert command.
pub fn main() -> ExitCode {
    main_with_name("bank-csv-to-ledger")
}

/// Main entry point with custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    init_logging(&args);

    let mut stdout = io::stdout().lock();
    // Not locked: matching logs to stderr from worker threads.
    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    match run_with_color(&args, &mut stdout, &mut stderr, color) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let default = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Ignore the error when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// The default rule file, `~/.bank-csv-to-ledger/rules.txt`.
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bank-csv-to-ledger").join("rules.txt"))
}

/// Run a conversion, writing results to `out` and diagnostics to `err`.
///
/// Diagnostics are written without color.
pub fn run<W: Write, E: Write>(args: &Args, out: &mut W, err: &mut E) -> Result<()> {
    run_with_color(args, out, err, false)
}

/// Like [`run`], choosing whether rule file diagnostics use color.
pub fn run_with_color<W: Write, E: Write>(
    args: &Args,
    out: &mut W,
    err: &mut E,
    color: bool,
) -> Result<()> {
    let rules = load_rules(args, err, color)?;

    if args.list_rules {
        output::write_rules(out, &rules)?;
        return Ok(());
    }

    let profile = match &args.config {
        Some(path) => Profile::load(path)?,
        None => Profile::default(),
    };

    let csv_file = args.csv_file.as_deref().context("CSV_FILE is required")?;
    let account = args.account.as_deref().context("ACCOUNT is required")?;
    let config = importer_config(args, profile.csv).account(account).build();
    let mut import = config
        .extract(csv_file)
        .with_context(|| format!("failed to import {}", csv_file.display()))?;
    sort_by_date(&mut import.transactions);

    let options = render_options(args, profile.render);
    let classified = classify(&rules, &import.transactions, &options)
        .context("rule evaluation failed")?;

    if args.unmatched {
        output::write_unmatched(out, &classified)?;
    } else if args.unmatched_as_rules {
        output::write_rules(out, &skeleton_rules(&classified))?;
    } else {
        output::write_ledger(out, &classified)?;
    }
    out.flush()?;

    if !args.quiet {
        report::print_summary(&Summary::of(&classified), import.skipped(), err)?;
    }
    Ok(())
}

fn load_rules<E: Write>(args: &Args, err: &mut E, color: bool) -> Result<RuleSet> {
    let path = match &args.rules {
        Some(path) => path.clone(),
        None => default_rules_path().context("cannot locate the home directory; pass --rules")?,
    };

    match bankledger_rules::load(&path) {
        Ok(rules) => Ok(rules),
        Err(LoadError::Parse {
            path,
            source_text,
            error,
        }) => {
            report::report_rule_file_error(&error, &path, &source_text, color, err)?;
            anyhow::bail!("invalid rule file {}", path.display())
        }
        Err(e) => Err(e.into()),
    }
}

/// Profile settings overridden by explicit flags.
fn importer_config(args: &Args, csv: CsvConfig) -> CsvConfigBuilder {
    let mut builder = CsvConfigBuilder::from_config(csv);
    if let Some(layout) = &args.input_format {
        builder = builder.layout(layout);
    }
    if let Some(format) = &args.date_format {
        builder = builder.date_format(format);
    }
    if let Some(delimiter) = args.delimiter {
        builder = builder.delimiter(delimiter);
    }
    if args.ignore_first_line {
        builder = builder.skip_first_row(true);
    }
    if args.strict {
        builder = builder.strict(true);
    }
    if args.trim_description {
        builder = builder.trim_description(true);
    }
    builder
}

fn render_options(args: &Args, mut options: RenderOptions) -> RenderOptions {
    if let Some(mode) = args.tax_mode {
        options.tax_mode = mode.into();
    }
    if let Some(sign) = args.fixed_sign {
        options.fixed_sign = sign.into();
    }
    options
}
