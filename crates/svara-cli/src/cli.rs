//! Command-line arguments.

use clap::{Parser, Subcommand};

/// Švara admin - manage clients and car photos
#[derive(Parser, Debug)]
#[command(name = "svara", author, version)]
#[command(about = "Švara auto-detailing admin tool", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SVARA_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign-in session management
    Auth {
        /// Auth action
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Client records
    Clients {
        /// Clients action
        #[command(subcommand)]
        action: ClientsAction,
    },
    /// Configuration file management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `svara auth` actions.
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Sign in with email and password
    SignIn {
        /// Account email
        #[arg(long, env = "SVARA_EMAIL")]
        email: String,
        /// Account password (prompted for when omitted)
        #[arg(long, env = "SVARA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    SignUp {
        /// Account email
        #[arg(long, env = "SVARA_EMAIL")]
        email: String,
        /// Account password (prompted for when omitted)
        #[arg(long, env = "SVARA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    SignOut,
    /// Show who is signed in
    Status,
}

/// `svara clients` actions.
#[derive(Subcommand, Debug)]
pub enum ClientsAction {
    /// List clients, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a client
    Add {
        /// Client name
        #[arg(long)]
        name: String,
        /// Contact email
        #[arg(long)]
        email: String,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Note about the job
        #[arg(long)]
        text: Option<String>,
        /// Car photo to upload
        #[arg(long)]
        image: Option<String>,
        /// Photo MIME type (inferred from the extension by default)
        #[arg(long, requires = "image")]
        content_type: Option<String>,
    },
    /// Edit a client; omitted fields keep their value, empty ones clear it
    Edit {
        /// Client id
        id: i64,
        /// Client name
        #[arg(long)]
        name: Option<String>,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Note about the job
        #[arg(long)]
        text: Option<String>,
        /// Replacement car photo
        #[arg(long)]
        image: Option<String>,
        /// Photo MIME type (inferred from the extension by default)
        #[arg(long, requires = "image")]
        content_type: Option<String>,
    },
    /// Print a time-limited URL for a client's photo
    ImageUrl {
        /// Client id
        id: i64,
    },
}

/// `svara config` actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key (e.g. `supabase.bucket`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Where to write it (default location otherwise)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
