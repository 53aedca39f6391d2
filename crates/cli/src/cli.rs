use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "drivetube",
    version,
    about = "Upload one unprocessed video from a Google Drive folder to YouTube",
    after_help = "Meant to be started by an external scheduler (cron, systemd timer). \
Each `run` uploads at most one video."
)]
pub struct Cli {
    /// Configuration file
    #[arg(long, short, env = "DRIVETUBE_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, env = "DRIVETUBE_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Upload one randomly chosen unprocessed video (default)
    Run,
    /// List videos that have not been uploaded yet
    Pending,
    /// Show upload counts and the most recent upload
    Status,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["drivetube"]).unwrap();
        assert_eq!(cli.command(), Commands::Run);
        assert!(!cli.json);
    }

    #[test]
    fn test_subcommands_and_flags() {
        let cli =
            Cli::try_parse_from(["drivetube", "--config", "/etc/drivetube.toml", "pending", "--json"])
                .unwrap();
        assert_eq!(cli.command(), Commands::Pending);
        assert_eq!(cli.config, PathBuf::from("/etc/drivetube.toml"));
        assert!(cli.json);

        let cli = Cli::try_parse_from(["drivetube", "status"]).unwrap();
        assert_eq!(cli.command(), Commands::Status);

        let cli = Cli::try_parse_from(["drivetube", "run", "--log-json"]).unwrap();
        assert!(cli.log_json);
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["drivetube", "delete-everything"]).is_err());
    }
}
