//! Clap derive structures for the `nethawk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nethawk -- network toolkit from the command line
#[derive(Debug, Parser)]
#[command(
    name = "nethawk",
    version,
    about = "Scan, browse and monitor networks through a NetHawk backend",
    long_about = "A command-line client for the NetHawk network toolkit backend.\n\n\
        Port and network scans, FTP browsing, mail inspection and bandwidth\n\
        monitoring run on the backend and stream results over its push channel.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "NETHAWK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "NETHAWK_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETHAWK_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NETHAWK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (profile value when unset)
    #[arg(long, env = "NETHAWK_TIMEOUT", global = true)]
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
    /// Browse FTP servers through saved connection profiles
    Ftp(FtpArgs),

    /// Inspect mailboxes and manage mail profiles
    #[command(alias = "m")]
    Mail(MailArgs),

    /// Run port and network scans
    #[command(alias = "s")]
    Scan(ScanArgs),

    /// Monitor link bandwidth
    #[command(alias = "bw")]
    Bandwidth(BandwidthArgs),

    /// Show dashboard statistics, traffic and recent activity
    #[command(alias = "ov")]
    Overview,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── FTP ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FtpArgs {
    #[command(subcommand)]
    pub command: FtpCommand,
}

#[derive(Debug, Subcommand)]
pub enum FtpCommand {
    /// List saved FTP connection profiles
    #[command(alias = "ls-profiles")]
    Profiles,

    /// Connect with a profile, list a directory, then disconnect
    Ls {
        /// FTP profile ID
        profile_id: String,

        /// Directory to list (defaults to the server root)
        path: Option<String>,

        /// FTP password (else env, keyring, or prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Render a saved Unix `LIST` response offline (file, or stdin when omitted)
    Parse {
        /// File holding raw `LIST` output
        file: Option<PathBuf>,
    },
}

// ── Mail ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MailArgs {
    #[command(subcommand)]
    pub command: MailCommand,
}

#[derive(Debug, Subcommand)]
pub enum MailCommand {
    /// Manage saved mail profiles
    Profiles(MailProfilesArgs),

    /// List one page of a mailbox
    Inbox {
        /// Mail profile ID
        profile_id: String,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Messages per page (config value when unset)
        #[arg(long)]
        per_page: Option<u32>,

        /// Mailbox to list (config value when unset)
        #[arg(long)]
        mailbox: Option<String>,

        /// Mail password (else env, keyring, or prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show one message
    Read {
        /// Mail profile ID
        profile_id: String,

        /// Message UID
        uid: String,

        /// Mailbox holding the message (config value when unset)
        #[arg(long)]
        mailbox: Option<String>,

        /// Mail password (else env, keyring, or prompt)
        #[arg(long)]
        password: Option<String>,
    },

    /// Send a test message through a profile's SMTP server
    SendTest {
        /// Mail profile ID
        profile_id: String,

        /// Recipient address
        #[arg(long)]
        to: String,

        /// Subject line
        #[arg(long, default_value = "NetHawk test message")]
        subject: String,

        /// Message body
        #[arg(long, default_value = "This is a test message sent by NetHawk.")]
        body: String,

        /// Mail password (else env, keyring, or prompt)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct MailProfilesArgs {
    #[command(subcommand)]
    pub command: MailProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum MailProfilesCommand {
    /// List saved mail profiles
    #[command(alias = "ls")]
    List,

    /// Save a new mail profile on the backend
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// IMAP server host
        #[arg(long)]
        imap_host: String,

        /// IMAP server port
        #[arg(long, default_value = "993")]
        imap_port: u16,

        /// SMTP server host
        #[arg(long)]
        smtp_host: String,

        /// SMTP server port
        #[arg(long, default_value = "587")]
        smtp_port: u16,

        /// Account user name
        #[arg(long)]
        username: String,

        /// Account password (prompted when unset)
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a saved mail profile
    #[command(alias = "rm")]
    Delete {
        /// Mail profile ID
        id: String,
    },
}

// ── Scan ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(subcommand)]
    pub command: ScanCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScanCommand {
    /// Scan ports on a single host
    Ports {
        /// Target host name or IPv4 address
        host: String,

        /// Ports to scan, e.g. 22,80,1000-1010
        #[arg(long, short = 'P')]
        ports: Option<String>,

        /// Include the well-known service ports
        #[arg(long)]
        common: bool,

        /// Scan technique
        #[arg(long = "type", short = 't', default_value = "tcp-connect")]
        scan_type: PortScanKind,

        /// List every scanned port, not only open ones
        #[arg(long)]
        all: bool,
    },

    /// Discover devices in an address range
    Network {
        /// Address range, e.g. 192.168.1.0/24 or 192.168.1.1-254
        range: String,

        /// Scan depth
        #[arg(long = "type", short = 't', default_value = "quick")]
        scan_type: NetworkScanKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PortScanKind {
    TcpConnect,
    TcpSyn,
    Udp,
    TcpFin,
    TcpNull,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NetworkScanKind {
    Quick,
    Full,
    Stealth,
}

// ── Bandwidth ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BandwidthArgs {
    #[command(subcommand)]
    pub command: BandwidthCommand,
}

#[derive(Debug, Subcommand)]
pub enum BandwidthCommand {
    /// Stream bandwidth samples until interrupted
    Watch {
        /// Stop after this many samples
        #[arg(long, short = 'n')]
        samples: Option<usize>,
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
    /// Interactive configuration wizard
    Init,

    /// Show the current configuration
    Show,

    /// Print the config file location
    Path,

    /// Store an FTP or mail password in the system keyring
    SetPassword {
        /// Which kind of profile the password unlocks
        #[arg(value_enum)]
        kind: SecretTarget,

        /// Backend profile ID
        profile_id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretTarget {
    Ftp,
    Mail,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
