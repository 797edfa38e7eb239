//! CLI command implementations.

mod dry_run;
mod sync;

pub use dry_run::DryRunDiff;
pub use sync::{SyncArgs, run_sync};
