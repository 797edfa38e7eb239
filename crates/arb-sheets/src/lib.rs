#![doc = include_str!("../README.md")]

pub mod arb_dir;
pub mod codec;
pub mod dispatch;
pub mod document;
mod error;
pub mod grid;
pub mod language;
pub mod reconcile;
pub mod sheet;
pub mod value;

pub use arb_dir::ArbDirectory;
pub use dispatch::{apply, plan, run};
pub use document::{Document, Entry, SetOutcome};
pub use error::{ErrorKind, SyncError};
pub use grid::{Column, Grid, KEY_COLUMN, Row};
pub use language::{LanguageCase, LanguageCode};
pub use reconcile::{DocumentChange, GridAppend, GridChange, Mode, Reconciliation, reconcile};
pub use sheet::{MemorySheet, SheetAdapter, SheetBackend, SheetWrite};
pub use value::Cell;

#[doc(hidden)]
pub use unic_langid;
