mod count;
mod split;
mod tag;

use clap::Subcommand;
use eyre::Result;

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(display_order = 1)]
    Tag(tag::Tag),
    #[command(display_order = 2)]
    Split(split::Split),
    #[command(display_order = 3)]
    Count(count::Count),
}

impl Command {
    pub fn execute(&self) -> Result<()> {
        match self {
            Command::Tag(cmd) => cmd.execute(),
            Command::Split(cmd) => cmd.execute(),
            Command::Count(cmd) => cmd.execute(),
        }
    }
}
