//! Shell completions command handler

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::generate;
use std::io::Write;

/// Handle the completions command
pub fn handle_completions(args: CompletionsArgs, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(args.shell.to_clap_shell(), &mut cmd, name, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Shell;

    #[test]
    fn test_bash_completions_mention_subcommands() {
        let mut script = Vec::new();
        handle_completions(CompletionsArgs { shell: Shell::Bash }, &mut script).unwrap();

        let script = String::from_utf8(script).unwrap();
        assert!(script.contains("crsops"));
        assert!(script.contains("transform"));
        assert!(script.contains("fetch"));
    }
}
