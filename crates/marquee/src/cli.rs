//! Clap derive structures for the `marquee` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// marquee -- movie showtimes near campus, from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "marquee",
    version,
    about = "Browse movie showtimes from the command line",
    long_about = "Sign in to the showtime backend, then list theaters and the\n\
        movies playing at them. Filter by title or theater and print the\n\
        detail route for each movie.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "MARQUEE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account API base URL (overrides profile)
    #[arg(long, env = "MARQUEE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Theater listing URL (overrides profile)
    #[arg(long, env = "MARQUEE_THEATERS_URL", global = true)]
    pub theaters_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MARQUEE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MARQUEE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MARQUEE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, sign in and manage the stored session
    Auth(AuthArgs),

    /// List theaters and the movies showing at them
    #[command(alias = "t")]
    Theaters(TheatersArgs),

    /// Show the signed-in user's profile picture URL
    Photo,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Create a new account
    Signup {
        #[arg(long, short = 'u')]
        username: String,

        #[arg(long, short = 'e')]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "MARQUEE_PASSWORD", hide_env = true)]
        password: Option<String>,
    },

    /// Sign in, prompting for a verification code if the backend asks
    Signin {
        #[arg(long, short = 'e')]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "MARQUEE_PASSWORD", hide_env = true)]
        password: Option<String>,
    },

    /// Finish a sign-in with the emailed verification code
    Verify {
        #[arg(long, short = 'e')]
        email: String,

        /// Verification code
        #[arg(long)]
        otp: String,
    },

    /// Show whether a session is stored
    Status,

    /// Forget the stored session
    #[command(alias = "signout")]
    Logout,
}

// ── Theaters ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TheatersArgs {
    /// Only movies whose title contains this text (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only this theater (exact name)
    #[arg(long, short = 't')]
    pub theater: Option<String>,

    /// Print the detail route for each movie
    #[arg(long)]
    pub routes: bool,

    /// List theater names only
    #[arg(long, conflicts_with_all = ["search", "routes"])]
    pub names: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
