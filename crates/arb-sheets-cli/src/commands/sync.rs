//! The sync command: one reconciliation pass between the ARB files and the sheet.

use crate::commands::DryRunDiff;
use crate::core::CliError;
use crate::sheets::SheetSource;
use crate::utils::ui;
use arb_sheets::{
    ArbDirectory, GridChange, LanguageCase, LanguageCode, Mode, Reconciliation, SheetAdapter,
    SheetBackend,
};
use arb_sheets_toml::{LanguageCaseSetting, SyncConfig};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Arguments for the sync command.
#[derive(Debug, Parser)]
pub struct SyncArgs {
    /// Rebuild the sheet from the ARB files, replacing its content.
    #[arg(long)]
    pub init: bool,

    /// Append keys and languages the sheet does not have yet.
    #[arg(long)]
    pub push: bool,

    /// Project directory holding arb-sheets.toml.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Google Sheets spreadsheet key, the id in its URL.
    #[arg(long, conflicts_with = "sheet_file")]
    pub sheet_key: Option<String>,

    /// OAuth access token for Google Sheets.
    #[arg(long, env = "ARB_SHEETS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Use a local JSON file of rows instead of Google Sheets.
    #[arg(long)]
    pub sheet_file: Option<PathBuf>,

    /// Dry run - show what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Log every decision to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Deterministic output for end-to-end tests.
    #[arg(long, hide = true)]
    pub e2e: bool,
}

pub fn language_case(setting: LanguageCaseSetting) -> LanguageCase {
    match setting {
        LanguageCaseSetting::Canonical => LanguageCase::Canonical,
        LanguageCaseSetting::Lower => LanguageCase::Lower,
        LanguageCaseSetting::Preserve => LanguageCase::Preserve,
    }
}

/// The ARB directory described by the configuration.
pub fn arb_directory(config: &SyncConfig, base_dir: &Path) -> ArbDirectory {
    let case = language_case(config.language_case);
    let template = config.template_language.as_deref().and_then(|raw| {
        let code = LanguageCode::parse(raw, case);
        if code.is_none() {
            tracing::warn!("Ignoring template language '{}'", raw);
        }
        code
    });

    ArbDirectory::new(
        config.arb_dir_from_base(base_dir),
        config.file_prefix.clone(),
        case,
    )
    .with_template(template)
}

/// Run the sync command.
pub fn run_sync(args: SyncArgs) -> Result<(), CliError> {
    // Checked before any file or sheet is touched
    let mode = Mode::from_flags(args.init, args.push)?;

    let config = SyncConfig::read_from_dir(&args.path)?;
    let arb = arb_directory(&config, &args.path);
    let source = SheetSource::resolve(
        args.sheet_file.as_deref(),
        args.sheet_key.as_deref(),
        &config,
        &args.path,
    )?;
    let backend = source.open(args.token.as_deref())?;
    let mut sheet = SheetAdapter::new(backend, arb.case());

    ui::print_header(mode, args.dry_run);

    let message = if mode.reads_sheet() {
        "Reading ARB files and sheet..."
    } else {
        "Reading ARB files..."
    };
    let pb = ui::create_spinner(message);
    let planned = arb_sheets::plan(mode, &arb, &mut sheet);
    pb.finish_and_clear();
    let reconciliation = planned?;

    report(&reconciliation, &arb, args.dry_run)?;

    if reconciliation.is_noop() {
        ui::print_all_in_sync();
        return Ok(());
    }

    let files = reconciliation.changed_documents().count();
    if !args.dry_run {
        let pb = ui::create_spinner("Writing...");
        let applied = apply(&reconciliation, &arb, &mut sheet);
        pb.finish_and_clear();
        applied?;
    }

    ui::print_summary(files, args.dry_run);
    Ok(())
}

fn apply<B: SheetBackend>(
    reconciliation: &Reconciliation,
    arb: &ArbDirectory,
    sheet: &mut SheetAdapter<B>,
) -> Result<(), CliError> {
    let written = arb_sheets::apply(reconciliation, arb, sheet)?;
    tracing::debug!("Wrote {} file(s)", written.len());
    Ok(())
}

fn report(
    reconciliation: &Reconciliation,
    arb: &ArbDirectory,
    dry_run: bool,
) -> Result<(), CliError> {
    for change in reconciliation.changed_documents() {
        let path = arb.target_of(&change.document);
        ui::print_document_change(change, &path, dry_run);

        if dry_run {
            let diff = DryRunDiff::for_document(arb, change)?;
            if !diff.is_empty() {
                diff.print();
            }
        } else {
            for key in change.added.iter().chain(&change.updated) {
                ui::print_key(key);
            }
        }
    }

    match &reconciliation.grid {
        GridChange::Unchanged => {},
        GridChange::Replace(grid) => {
            ui::print_sheet_replaced(grid.languages().count(), grid.len(), dry_run);
        },
        GridChange::Append(append) => ui::print_sheet_appended(append, dry_run),
    }

    Ok(())
}
