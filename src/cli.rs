use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytqa",
    about = "Ask questions about YouTube videos",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// API key for the chat-completion provider
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// LLM model used to answer questions
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Preferred caption languages, in order (repeatable)
    #[arg(short, long = "lang", global = true)]
    pub languages: Vec<String>,

    /// Show progress details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding index.html and static assets
        #[arg(long)]
        frontend: Option<PathBuf>,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube video URL or video ID
        url: String,

        /// Question to ask about the video
        question: String,
    },

    /// Print a video's transcript
    Transcript {
        /// YouTube video URL or video ID
        url: String,

        /// Print raw caption segments with start times
        #[arg(short, long)]
        timestamps: bool,

        /// Output format for timestamped segments
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
