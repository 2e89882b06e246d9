mod resolve;

use miette::Result;

use crate::cli::Cli;

pub fn run(args: Cli) -> Result<()> {
    resolve::run(args)
}
