//! completions command - Generate shell completion scripts

use clap::{Args, CommandFactory};
use clap_complete::{Shell, generate};

use super::Cli;
use crate::exit_code::ExitCode;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> ExitCode {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "ol", &mut std::io::stdout());
    ExitCode::Success
}
