use clap::{Parser, Subcommand};

use super::constants::{ENV_HOST, ENV_PORT};

#[derive(Parser)]
#[command(name = "fitgate")]
#[command(version, about = "Fitness warehouse query & caching API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server (default when no command is given)
    Start,

    /// Cache maintenance commands
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Delete cached entries matching a glob pattern
    Flush {
        /// Key pattern to delete (e.g. "sessions_list_*"); all keys by default
        #[arg(long, default_value = "*")]
        pattern: String,
    },
}

/// Values extracted from the CLI that feed configuration loading
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Parse command line arguments into config overrides and the command to run
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    (
        CliConfig {
            host: cli.host,
            port: cli.port,
        },
        cli.command,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cache_flush_pattern() {
        let cli = Cli::parse_from(["fitgate", "cache", "flush", "--pattern", "sessions_list_*"]);
        match cli.command {
            Some(Commands::Cache {
                command: CacheCommands::Flush { pattern },
            }) => assert_eq!(pattern, "sessions_list_*"),
            _ => panic!("expected cache flush command"),
        }
    }
}
