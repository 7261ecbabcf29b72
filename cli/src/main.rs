use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use tracing_subscriber::filter::LevelFilter;

mod render;
mod session;

#[derive(Debug, Parser)]
#[command(name = "minado", version, about = "Single-player terminal minesweeper")]
struct Cli {
    /// Board rows, 1-20; prompted interactively when omitted
    #[arg(long)]
    rows: Option<u8>,

    /// Board columns, 1-25; prompted interactively when omitted
    #[arg(long)]
    cols: Option<u8>,

    /// Mine placement seed; taken from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    verbosity: Verbosity,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity.log_level_filter());

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    session::Session::new(stdin, stdout).run(cli.rows, cli.cols, cli.seed)
}

/// Logs go to stderr so they never interleave with the board on stdout.
/// The fmt subscriber also bridges the `log` records the engine emits.
fn init_logging(filter: log::LevelFilter) {
    let max_level = match filter {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
