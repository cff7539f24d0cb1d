//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Micro-Challenge Bot - a daily micro-challenge in your terminal
#[derive(Parser, Debug)]
#[command(
    name = "mcb",
    about = "Chat with an LLM that hands out one small challenge per day",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    /// Override the configured model
    #[arg(short, long)]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["mcb", "-c", "/tmp/mcb.yml", "--log-level", "debug", "-m", "gemini-1.5-pro"]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/mcb.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.model.as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn test_parse_no_flags() {
        let cli = Cli::parse_from(["mcb"]);

        assert!(cli.config.is_none());
        assert!(cli.log_level.is_none());
        assert!(cli.model.is_none());
    }
}
