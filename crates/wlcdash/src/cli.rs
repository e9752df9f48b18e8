//! Clap derive structures for the `wlcdash` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wlcdash -- read-only client for wireless LAN controller dashboards
#[derive(Debug, Parser)]
#[command(
    name = "wlcdash",
    version,
    about = "Query a wireless LAN controller dashboard from the command line",
    long_about = "Reads client and application data from the JSON endpoints behind\n\
        a wireless LAN controller's web dashboard.",
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
    /// Controller profile to use
    #[arg(long, short = 'p', env = "WLCDASH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard URL (overrides profile)
    #[arg(long, short = 'c', env = "WLCDASH_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Web interface username (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WLCDASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verify the controller's TLS certificate against the system store
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WLCDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the configured credentials are accepted
    Login,

    /// Inspect associated wireless clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Inspect application usage
    Apps(AppsArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List every associated client
    #[command(alias = "ls")]
    List,

    /// Show one client's details
    Show {
        /// Client MAC address
        mac: String,

        /// Read every attribute group, not just the radio pane
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Per-application usage for one client
    Apps {
        /// Client MAC address
        mac: String,
    },
}

// ── Apps ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppsCommand {
    /// Busiest applications network-wide
    Top {
        /// Show at most this many rows
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Counters for one application
    Show {
        /// Exact application name
        name: String,

        /// Scope to one client instead of the whole network
        #[arg(long)]
        client: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the resolved configuration (passwords redacted)
    Show,

    /// Store a profile's password in the OS keyring (read from stdin)
    SetPassword,
}
