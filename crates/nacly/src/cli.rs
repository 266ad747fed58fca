//! Clap derive structures for the `nacly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use nacly_core::DriverKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nacly -- network access control from the command line
#[derive(Debug, Parser)]
#[command(
    name = "nacly",
    version,
    about = "Decide and enforce network access for MAC addresses",
    long_about = "Decides whether a device may join the network and on which VLAN,\n\
        programs the decision into the data plane, and records it.\n\n\
        Devices, policies, and per-user VLAN profiles live as JSON files in\n\
        the data directory; every decision is appended to the decision log.",
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
    /// Config file to use
    #[arg(long, env = "NACLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides storage.data_dir)
    #[arg(long, short = 'd', env = "NACLY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Southbound driver (overrides engine.driver)
    #[arg(long, env = "NACLY_DRIVER", global = true)]
    pub driver: Option<DriverArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NACLY_OUTPUT",
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
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DriverArg {
    /// Host firewall if available, otherwise mock
    Auto,
    /// Log intended actions only
    Mock,
    /// Program the local host firewall
    HostFirewall,
}

impl From<DriverArg> for DriverKind {
    fn from(arg: DriverArg) -> Self {
        match arg {
            DriverArg::Auto => Self::Auto,
            DriverArg::Mock => Self::Mock,
            DriverArg::HostFirewall => Self::HostFirewall,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decide, enforce, and record access for a MAC address
    #[command(alias = "v")]
    Validate(ValidateArgs),

    /// Manage registered devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage VLAN assignment policies
    #[command(alias = "pol", alias = "p")]
    Policies(PoliciesArgs),

    /// Manage per-user VLAN profiles
    Profiles(ProfilesArgs),

    /// Validate ACL rule files
    Acl(AclArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Validate ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// MAC address (AA-BB-CC-DD-EE-FF or aa:bb:cc:dd:ee:ff)
    pub mac: String,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List registered devices
    #[command(alias = "ls")]
    List {
        /// Only devices currently authorized
        #[arg(long, short = 'a')]
        authorized: bool,
    },

    /// Register or overwrite a device record
    Register {
        /// Device MAC address
        mac: String,

        /// Owning username
        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Stored VLAN (1-4094)
        #[arg(long)]
        vlan: Option<i64>,

        /// Register the device as blocked
        #[arg(long, conflicts_with = "vlan")]
        blocked: bool,
    },

    /// Remove a device record
    #[command(alias = "rm")]
    Remove {
        /// Device MAC address
        mac: String,
    },

    /// Import devices from a JSON array or a plain list of MACs
    Import {
        /// Seed file path
        file: PathBuf,
    },
}

// ── Policies ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// List policies
    #[command(alias = "ls")]
    List,

    /// Create or replace a policy
    #[command(group(
        ArgGroup::new("criteria")
            .args(["username", "mac_prefix", "default"])
            .multiple(false)
    ))]
    Set {
        /// Policy name (`default` is the catch-all)
        name: String,

        /// VLAN to assign (1-4094)
        #[arg(long)]
        vlan: i64,

        /// Match devices owned by this username
        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Match devices by OUI (AA-BB-CC or aa:bb:cc)
        #[arg(long)]
        mac_prefix: Option<String>,

        /// Mark as a default-criteria policy
        #[arg(long)]
        default: bool,
    },

    /// Delete a policy
    #[command(alias = "rm")]
    Delete {
        /// Policy name
        name: String,
    },
}

// ── Profiles ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List username → VLAN profiles
    #[command(alias = "ls")]
    List,

    /// Map a username to a VLAN
    Set {
        /// Username
        username: String,

        /// VLAN (1-4094)
        vlan: i64,
    },

    /// Remove a username's profile
    #[command(alias = "rm")]
    Remove {
        /// Username
        username: String,
    },

    /// Import profiles from a JSON object of `{ "user": vlan }`
    Import {
        /// Seed file path
        file: PathBuf,
    },
}

// ── ACL ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AclArgs {
    #[command(subcommand)]
    pub command: AclCommand,
}

#[derive(Debug, Subcommand)]
pub enum AclCommand {
    /// Validate and normalize a JSON file of ACL entries
    Validate {
        /// JSON file containing `[{ "rule": "...", "description": "..." }]`
        file: PathBuf,
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
    /// Write a config file populated with defaults
    Init,

    /// Display the effective configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
