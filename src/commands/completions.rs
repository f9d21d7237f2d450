//! Shell completions command

use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};
use opcat::error::Result;

fn write_completions(args: &CompletionsArgs, out: &mut impl std::io::Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(args.shell, &mut cmd, name, out);
}

/// Generate shell completions on stdout
pub fn run(args: &CompletionsArgs) -> Result<()> {
    write_completions(args, &mut std::io::stdout().lock());
    Ok(())
}
