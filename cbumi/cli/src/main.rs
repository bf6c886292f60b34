mod commands;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use env_logger::Env;
use eyre::Result;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Cell barcode / UMI tagging of paired FASTQ files and per-barcode splitting of aligned reads.
#[derive(Parser, Debug)]
#[command(name = "cbumi", version, styles = STYLES)]
struct Args {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    Args::parse().command.execute()
}
