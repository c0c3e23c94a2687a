//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Stellecta - chat with your AI mentors from the terminal
#[derive(Parser, Debug)]
#[command(name = "stellecta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API base URL (overrides the config file)
    #[arg(long, global = true, env = "STELLECTA_API_URL")]
    pub api_url: Option<String>,

    /// Config file to use instead of ~/.stellecta/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the access token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored tokens
    Logout,

    /// Show the signed-in account
    Whoami,

    /// List available mentors
    Mentors,

    /// List recent chat sessions
    Sessions {
        /// Maximum number of sessions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the messages of a session
    Messages {
        /// Session ID
        session_id: String,
    },

    /// Send one message and print the reply
    Send {
        /// Mentor to ask
        #[arg(short, long)]
        mentor: String,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<String>,

        /// Message to send
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },

    /// Start an interactive chat
    Chat {
        /// Mentor to start with
        #[arg(short, long)]
        mentor: Option<String>,

        /// Session to resume
        #[arg(short, long)]
        session: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn send_joins_trailing_words() {
        let cli = Cli::try_parse_from([
            "stellecta", "send", "--mentor", "stella", "what", "is", "pi?",
        ])
        .unwrap();
        match cli.command {
            Commands::Send {
                mentor,
                session,
                message,
            } => {
                assert_eq!(mentor, "stella");
                assert_eq!(session, None);
                assert_eq!(message.join(" "), "what is pi?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stellecta",
            "sessions",
            "--limit",
            "5",
            "--api-url",
            "http://127.0.0.1:9000/api/v1",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000/api/v1"));
        assert!(matches!(cli.command, Commands::Sessions { limit: Some(5) }));
    }
}
