//! Clap derive structures for the `dnacly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only clap types are used here so `build.rs` can include this file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dnacly -- Cisco DNA Center automation from the command line
#[derive(Debug, Parser)]
#[command(
    name = "dnacly",
    version,
    about = "Automate Cisco DNA Center: PnP onboarding, template pushes and SWIM upgrades",
    long_about = "Drive Cisco DNA Center (Catalyst Center) over its REST API.\n\n\
        Claims PnP devices from a CSV sheet, pushes templates to tagged devices,\n\
        distributes and activates software images in batches, and exposes the\n\
        inventory, site, tag and credential queries those workflows rely on.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "DNAC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance URL (overrides profile)
    #[arg(long, short = 'u', env = "DNAC_URL", global = true)]
    pub url: Option<String>,

    /// Username for the token exchange (overrides profile)
    #[arg(long, env = "DNAC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DNAC_OUTPUT",
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
    #[arg(long, short = 'k', env = "DNAC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DNAC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Token cache file (overrides profile)
    #[arg(long, env = "DNAC_TOKEN_CACHE", global = true)]
    pub token_cache: Option<PathBuf>,
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
    /// Acquire or validate the API token
    Auth(AuthArgs),

    /// Query the managed device inventory
    #[command(alias = "inv")]
    Inventory(InventoryArgs),

    /// List sites
    Sites(SitesArgs),

    /// Manage device tags
    Tags(TagsArgs),

    /// List global discovery credentials
    #[command(alias = "creds")]
    Credentials(CredentialsArgs),

    /// Browse and deploy configuration templates
    #[command(alias = "tpl")]
    Templates(TemplatesArgs),

    /// Plug-and-Play onboarding
    Pnp(PnpArgs),

    /// Software image distribution and activation
    Swim(SwimArgs),

    /// Manage CLI configuration
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
    /// Print a usable token, reusing the cached one when it is accepted
    Token,

    /// Check whether the cached token is still accepted
    Test,
}

// ── Inventory ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InventoryArgs {
    #[command(subcommand)]
    pub command: InventoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// List every managed device (all pages)
    #[command(alias = "ls")]
    List,

    /// Show one device by id
    Get {
        /// Device UUID
        id: String,
    },

    /// Show device detail by hostname
    Detail {
        /// Device hostname
        hostname: String,
    },

    /// Device health for a site (all pages)
    Health {
        /// Site UUID
        #[arg(long, short = 's')]
        site: String,
    },

    /// Devices of one platform (e.g. C9300-48P)
    ByPlatform {
        /// Platform id
        platform_id: String,
    },
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites
    #[command(alias = "ls")]
    List {
        /// Only buildings and floors, which devices can be claimed onto
        #[arg(long)]
        claimable: bool,
    },
}

// ── Tags ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// List tags
    #[command(alias = "ls")]
    List,

    /// Create a tag
    Create {
        /// Tag name
        name: String,
    },

    /// List network devices carrying a tag
    Members {
        /// Tag name
        name: String,
    },

    /// Tag network devices
    AddMember {
        /// Tag name
        name: String,

        /// Device UUIDs
        #[arg(required = true)]
        device_ids: Vec<String>,
    },
}

// ── Credentials ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CredentialsCommand {
    /// List global credentials by subtype
    #[command(alias = "ls")]
    List {
        /// Credential subtype (CLI, SNMPV2_READ_COMMUNITY, SNMPV2_WRITE_COMMUNITY,
        /// SNMPV3, HTTP_READ, HTTP_WRITE, NETCONF); repeatable
        #[arg(long = "subtype", short = 't', default_values = ["CLI", "SNMPV3"])]
        subtypes: Vec<String>,
    },
}

// ── Templates ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List template projects
    Projects,

    /// List templates
    #[command(alias = "ls")]
    List {
        /// Only templates in this project
        #[arg(long)]
        project: Option<String>,
    },

    /// Deploy a template to every device carrying a tag
    ///
    /// Anything not given on the command line is chosen interactively.
    Deploy {
        /// Tag name
        #[arg(long)]
        tag: Option<String>,

        /// Project name
        #[arg(long)]
        project: Option<String>,

        /// Template name or id
        #[arg(long)]
        template: Option<String>,

        /// Targets per deploy request (1-99, default from profile)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Show a deployment's status
    Status {
        /// Deployment id
        deployment_id: String,
    },
}

// ── PnP ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PnpArgs {
    #[command(subcommand)]
    pub command: PnpCommand,
}

#[derive(Debug, Subcommand)]
pub enum PnpCommand {
    /// List devices in the PnP portal
    #[command(alias = "ls")]
    List,

    /// Claim devices from a CSV sheet onto their sites
    ///
    /// Required columns: Serial Number, Hostname, VLAN, MGMT IP, VLAN IP, Site.
    Claim {
        /// Device sheet
        #[arg(long, short = 'd')]
        devices: PathBuf,

        /// Onboarding template id (default from profile)
        #[arg(long)]
        config_id: Option<String>,

        /// Directory for the unclaimable-serials report
        #[arg(long, default_value = ".")]
        report_dir: PathBuf,
    },

    /// Put managed devices back into PnP mode and remove them from inventory
    Reset {
        /// Positions from the listing (e.g. "1,3,7") or "all"
        #[arg(long, short = 's')]
        select: Option<String>,
    },
}

// ── SWIM ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SwimArgs {
    #[command(subcommand)]
    pub command: SwimCommand,
}

#[derive(Debug, Subcommand)]
pub enum SwimCommand {
    /// Distribute and/or activate an image on devices listed in a CSV
    Run {
        /// Hostname sheet (header row, one hostname per row)
        #[arg(long, short = 'd')]
        devices: Option<PathBuf>,

        /// Image UUID
        #[arg(long, short = 'i')]
        image: String,

        /// Distribute the image
        #[arg(long)]
        distribute: bool,

        /// Activate the image
        #[arg(long)]
        activate: bool,

        /// Devices per distribution request (1-40, default from profile)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Report directory (default from profile)
        #[arg(long)]
        log_dir: Option<PathBuf>,
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
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
