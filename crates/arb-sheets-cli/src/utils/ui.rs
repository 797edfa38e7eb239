// CLI output formatting with consistent styling using indicatif and colored.
// Diagnostics go through tracing on stderr; user-facing output uses println!.

use arb_sheets::{DocumentChange, GridAppend, Mode};
use colored::Colorize as _;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const PD_TICK: Duration = Duration::from_millis(100);

static E2E_MODE: AtomicBool = AtomicBool::new(false);

/// Enable E2E mode for deterministic output (no colors, hidden spinners).
pub fn set_e2e_mode(enabled: bool) {
    E2E_MODE.store(enabled, Ordering::SeqCst);
    if enabled {
        colored::control::set_override(false);
    }
}

pub fn is_e2e() -> bool {
    E2E_MODE.load(Ordering::SeqCst)
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "arb_sheets=debug,arb_sheets_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!is_e2e());

    let result = if is_e2e() {
        builder.without_time().try_init()
    } else {
        builder.try_init()
    };
    // A second call, e.g. from tests, keeps the first subscriber
    result.ok();
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    if is_e2e() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(PD_TICK);
    pb
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Update => "update",
        Mode::Init => "init",
        Mode::Push => "push",
    }
}

pub fn print_header(mode: Mode, dry_run: bool) {
    let suffix = if dry_run { " (dry run)" } else { "" };
    println!(
        "{} {}{}",
        "ARB Sheets".dimmed(),
        mode_label(mode).cyan(),
        suffix.yellow()
    );
}

pub fn print_document_change(change: &DocumentChange, path: &Path, dry_run: bool) {
    let language = change.document.language.as_str();
    let verb = match (change.created, dry_run) {
        (true, true) => "Would create",
        (true, false) => "Created",
        (false, true) => "Would update",
        (false, false) => "Updated",
    };
    println!("{} {}", verb.green(), path.display());

    if !change.added.is_empty() {
        println!(
            "  {} {} key(s) to {}",
            "added".dimmed(),
            change.added.len(),
            language.cyan()
        );
    }
    if !change.updated.is_empty() {
        println!(
            "  {} {} key(s) in {}",
            "changed".dimmed(),
            change.updated.len(),
            language.cyan()
        );
    }
}

pub fn print_key(key: &str) {
    println!("  {} {}", "->".dimmed(), key);
}

pub fn print_sheet_replaced(languages: usize, keys: usize, dry_run: bool) {
    let verb = if dry_run { "Would write" } else { "Wrote" };
    println!(
        "{} sheet with {} language(s) and {} key(s)",
        verb.green(),
        languages,
        keys
    );
}

pub fn print_sheet_appended(append: &GridAppend, dry_run: bool) {
    if !append.columns.is_empty() {
        let verb = if dry_run { "Would append" } else { "Appended" };
        let names: Vec<&str> = append.columns.iter().map(|code| code.as_str()).collect();
        println!(
            "{} {} column(s): {}",
            verb.green(),
            append.columns.len(),
            names.join(", ").cyan()
        );
    }
    if !append.rows.is_empty() {
        let verb = if dry_run { "Would append" } else { "Appended" };
        println!("{} {} row(s)", verb.green(), append.rows.len());
        for row in &append.rows {
            print_key(&row.key);
        }
    }
}

pub fn print_all_in_sync() {
    println!("{}", "Everything is in sync".green());
}

pub fn print_summary(files: usize, dry_run: bool) {
    if dry_run {
        println!(
            "{} {} file(s) would be written, nothing was changed",
            "Dry run:".yellow(),
            files
        );
    } else {
        println!("{} {} file(s) written", "Done:".green(), files);
    }
}

pub fn print_diff(path: &Path, old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    println!("{} {}", "---".dimmed(), path.display());

    let diff = TextDiff::from_lines(old, new);

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!("{}", "  ...".dimmed());
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                let line = format!("{} {}", sign, change);
                match change.tag() {
                    ChangeTag::Delete => print!("{}", line.red()),
                    ChangeTag::Insert => print!("{}", line.green()),
                    ChangeTag::Equal => print!("{}", line.dimmed()),
                }
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
}
