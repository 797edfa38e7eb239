//! Picks the mode, loads what it needs and writes the result back.

use crate::arb_dir::ArbDirectory;
use crate::error::SyncError;
use crate::reconcile::{GridChange, Mode, Reconciliation, reconcile};
use crate::sheet::{SheetAdapter, SheetBackend};
use std::path::PathBuf;

impl Mode {
    /// Resolve the command line flags to a mode.
    pub fn from_flags(init: bool, push: bool) -> Result<Self, SyncError> {
        match (init, push) {
            (true, true) => Err(SyncError::ConflictingModes),
            (true, false) => Ok(Mode::Init),
            (false, true) => Ok(Mode::Push),
            (false, false) => Ok(Mode::Update),
        }
    }
}

/// Read both stores and compute what `mode` would change. Nothing is written.
pub fn plan<B: SheetBackend>(
    mode: Mode,
    arb: &ArbDirectory,
    sheet: &mut SheetAdapter<B>,
) -> Result<Reconciliation, SyncError> {
    let documents = arb.load_documents()?;
    tracing::debug!("Loaded {} ARB file(s)", documents.len());

    let grid = if mode.reads_sheet() {
        Some(sheet.read_grid()?)
    } else {
        None
    };

    reconcile(mode, grid.as_ref(), documents)
}

/// Write a computed reconciliation back. Returns the paths of written files.
pub fn apply<B: SheetBackend>(
    reconciliation: &Reconciliation,
    arb: &ArbDirectory,
    sheet: &mut SheetAdapter<B>,
) -> Result<Vec<PathBuf>, SyncError> {
    let mut written = Vec::new();
    for change in reconciliation.changed_documents() {
        written.push(arb.write_document(&change.document)?);
    }

    match &reconciliation.grid {
        GridChange::Unchanged => {},
        GridChange::Replace(grid) => sheet.write_grid(grid)?,
        GridChange::Append(append) => {
            sheet.append_columns(&append.columns)?;
            sheet.append_rows(&append.rows)?;
        },
    }

    Ok(written)
}

/// [`plan`] followed by [`apply`], unless `dry_run` is set.
pub fn run<B: SheetBackend>(
    mode: Mode,
    arb: &ArbDirectory,
    sheet: &mut SheetAdapter<B>,
    dry_run: bool,
) -> Result<Reconciliation, SyncError> {
    let reconciliation = plan(mode, arb, sheet)?;
    if !dry_run {
        apply(&reconciliation, arb, sheet)?;
    }
    Ok(reconciliation)
}
