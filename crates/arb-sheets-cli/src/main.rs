use arb_sheets_cli::commands::{SyncArgs, run_sync};
use arb_sheets_cli::utils::ui;
use clap::Parser;
use miette::Result as MietteResult;

#[derive(Parser)]
#[command(name = "arb-sheets")]
#[command(about = "Sync Flutter ARB files with a translation spreadsheet")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

fn main() -> MietteResult<()> {
    let cli = Cli::parse();

    // Plain diagnostics in e2e mode so test output does not depend on the terminal
    let fancy = !cli.sync.e2e;
    miette::set_hook(Box::new(move |_| {
        let opts = miette::MietteHandlerOpts::new()
            .terminal_links(fancy)
            .unicode(fancy)
            .color(fancy)
            .context_lines(2)
            .tab_width(4);
        Box::new(if fancy { opts } else { opts.width(200) }.build())
    }))
    .ok();

    ui::set_e2e_mode(cli.sync.e2e);
    ui::init_logging(cli.sync.verbose);

    run_sync(cli.sync).map_err(miette::Report::new)
}
