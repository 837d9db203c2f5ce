//! Command-line definition (clap derive).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "netrefit",
    version,
    about = "Refresh device generations and migrate site networks between templates"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use.
    #[arg(long, short = 'P', global = true)]
    pub profile: Option<String>,

    /// Dashboard API root URL.
    #[arg(long, global = true, env = "NETREFIT_BASE_URL")]
    pub base_url: Option<String>,

    /// Organization id.
    #[arg(long, global = true, env = "NETREFIT_ORG_ID")]
    pub org_id: Option<String>,

    /// API key (prefer the config file or NETREFIT_API_KEY).
    #[arg(long, global = true, env = "NETREFIT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format.
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Answer yes to all confirmation prompts.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect device inventory.
    Devices(DevicesArgs),

    /// Run the device-refresh workflow against one network.
    Refresh(RefreshArgs),

    /// Migrate one network to a new configuration template.
    Migrate(MigrateArgs),

    /// Manage firmware-staging networks.
    Staging(StagingArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

// ── devices ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices in a network, or the whole organization inventory.
    List {
        /// Network id; omit to list the organization inventory.
        #[arg(long)]
        network: Option<String>,
    },
}

// ── refresh ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Network id to refresh.
    #[arg(long)]
    pub network: String,

    /// JSON plan document describing the device changes.
    #[arg(long)]
    pub plan: PathBuf,

    /// Directory for the run summary file (default: current directory).
    #[arg(long)]
    pub summary_dir: Option<PathBuf>,
}

// ── migrate ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Network id to move.
    #[arg(long)]
    pub network: String,

    /// Target configuration template id.
    #[arg(long)]
    pub template: String,

    /// VLAN ids to snapshot and restore (default: 1,2,3,4,5,7,999).
    #[arg(long, value_delimiter = ',')]
    pub vlans: Option<Vec<u16>>,
}

// ── staging ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StagingArgs {
    #[command(subcommand)]
    pub command: StagingCommand,
}

#[derive(Debug, Subcommand)]
pub enum StagingCommand {
    /// Show slot occupancy of every staging network.
    Capacity,

    /// Distribute a batch of serials across the staging networks.
    Distribute {
        /// Device serials (max 20).
        #[arg(required = true)]
        serials: Vec<String>,
    },

    /// Remove staged devices from one staging network.
    Remove {
        /// Staging network id or configured name.
        #[arg(long)]
        network: String,

        /// Device serials to remove.
        #[arg(required = true)]
        serials: Vec<String>,
    },

    /// Remove every staged device from every staging network.
    RemoveAll {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

// ── completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
