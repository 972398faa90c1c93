use clap::{Parser, Subcommand};

/// `MentalCare` - supportive chat backend with sentiment triage.
#[derive(Parser, Debug)]
#[command(name = "mentalcare")]
#[command(version)]
#[command(about = "Supportive chat backend with sentiment triage and helpline referral.", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind (defaults to gateway.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (use 0 for a random available port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one chat message through the pipeline
    Send {
        /// User identifier the turn belongs to
        #[arg(short, long)]
        user: String,

        /// Message text
        message: String,
    },

    /// Print a user's conversation history, oldest first
    History {
        #[arg(short, long)]
        user: String,
    },

    /// Delete every stored turn for a user
    Forget {
        #[arg(short, long)]
        user: String,
    },

    /// Show where the navigation policy sends a path
    Navigate {
        /// Path to check, e.g. /chat
        path: String,

        /// Evaluate as a signed-in user
        #[arg(long)]
        authenticated: bool,
    },

    /// Show resolved configuration
    Status,
}
