use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  opcat completions bash > ~/.local/share/bash-completion/completions/opcat\n  \
                  opcat completions zsh > ~/.zfunc/_opcat\n  \
                  opcat completions fish > ~/.config/fish/completions/opcat.fish")]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
