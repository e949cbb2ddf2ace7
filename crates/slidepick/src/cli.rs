use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slidepick")]
#[command(author, version, about)]
#[command(long_about = "Collect slides from a presentation library into a new deck.\n\n\
    Browse the presentations served by a slide server, drag slides into an\n\
    ordered collection and watch the server's processing status live.\n\n\
    Examples:\n  \
    slidepick library.json                Open the collector (maximized)\n  \
    slidepick library.json --windowed     Open in a normal window\n  \
    slidepick status                      Follow the processing status\n  \
    slidepick config set defaults.theme dark")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Library document (JSON) listing presentations and their slides
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server base URL (overrides server.base_url from the config)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Open in a window instead of maximized
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the server's processing status until interrupted
    Status,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.search_mode, server.base_url)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// Log filter implied by `-q` / `-v`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Status) => crate::commands::status::run(self.server.as_deref()),
            Some(Commands::Version) => {
                println!("slidepick {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(library) = self.library {
                    if !library.exists() {
                        anyhow::bail!("File not found: {}", library.display());
                    }
                    crate::app::run(library, self.server, self.windowed)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_from_flags() {
        let cli = Cli::parse_from(["slidepick", "-vv", "status"]);
        assert_eq!(cli.log_level(), "trace");
        let cli = Cli::parse_from(["slidepick", "-q", "-v", "lib.json"]);
        assert_eq!(cli.log_level(), "error");
        let cli = Cli::parse_from(["slidepick", "lib.json"]);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_library_and_server_flag() {
        let cli = Cli::parse_from([
            "slidepick",
            "lib.json",
            "--server",
            "http://slides:9000",
            "--windowed",
        ]);
        assert_eq!(cli.library, Some(PathBuf::from("lib.json")));
        assert_eq!(cli.server.as_deref(), Some("http://slides:9000"));
        assert!(cli.windowed);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_set_parses() {
        let cli = Cli::parse_from(["slidepick", "config", "set", "defaults.theme", "dark"]);
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "defaults.theme");
                assert_eq!(value, "dark");
            }
            _ => panic!("expected config set"),
        }
    }
}
