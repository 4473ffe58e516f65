//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

const AFTER_HELP: &str = "\
EXAMPLES:
  chat-md normalize messages.json             Normalize a message, array or JSON Lines file
  cat msg.json | chat-md normalize            Read messages from stdin
  chat-md normalize -l es --translate m.json  Show Spanish translations where present
  chat-md parse \"*hi* @ana\"                   Print the parsed tree for some text
  chat-md config                              Show config path and resolved settings
  chat-md completions bash                    Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalize chat messages and parse their text into message trees",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize messages: drop stale nulls and add parsed `md` trees
    Normalize(NormalizeArgs),
    /// Parse text into a message tree
    Parse {
        /// Text to parse ('-' or omitted reads stdin)
        text: Option<String>,
        #[command(flatten)]
        parse: ParseFlags,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Show config path and resolved settings
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct NormalizeArgs {
    /// Input file: one message, an array of messages, or JSON Lines ('-' or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Auto-translate language (e.g. es, pt-BR)
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Show translations for every message that has one in the language
    #[arg(long)]
    pub translate: bool,

    /// Viewing user id; their own messages are never translated
    #[arg(long)]
    pub viewer: Option<String>,

    #[command(flatten)]
    pub parse: ParseFlags,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Parser options settable from the command line.
#[derive(clap::Args)]
pub struct ParseFlags {
    /// Turn ASCII emoticons such as :) into emoji
    #[arg(long)]
    pub emoticons: bool,

    /// Domain whose schemeless links become links (repeatable)
    #[arg(long = "domain", value_name = "DOMAIN")]
    pub domains: Vec<String>,
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
