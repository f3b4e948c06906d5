//! Clap derive structures for the `gsa` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gsa -- administer search appliances through their feed API
#[derive(Debug, Parser)]
#[command(
    name = "gsa",
    version,
    about = "Administer search appliances from the command line",
    long_about = "Reads and writes appliance feeds (config, status, policyAcls, ...),\n\
        bulk-imports policy ACL rules, and monitors crawl status across many\n\
        appliances at once.",
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
    #[arg(long, short = 'p', env = "GSA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance hostname (overrides profile)
    #[arg(long, env = "GSA_HOST", global = true)]
    pub host: Option<String>,

    /// Admin port (default 8000)
    #[arg(long, env = "GSA_PORT", global = true)]
    pub port: Option<u16>,

    /// Protocol used to reach the admin port
    #[arg(long, env = "GSA_PROTOCOL", global = true)]
    pub protocol: Option<Protocol>,

    /// Admin username
    #[arg(long, short = 'u', env = "GSA_USERNAME", global = true)]
    pub username: Option<String>,

    /// Read the password from stdin instead of env/keyring/profile
    #[arg(long, global = true)]
    pub password_stdin: bool,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "GSA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

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
    #[arg(long, short = 'k', env = "GSA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GSA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Atom XML as the appliance speaks it
    Xml,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Pretty table
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a feed, or one entry of it
    #[command(alias = "get")]
    Retrieve(RetrieveArgs),

    /// Insert an entry from an Atom entry document
    Insert(InsertArgs),

    /// Replace an entry from an Atom entry document
    Update(UpdateArgs),

    /// Delete one entry
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Manage policy ACL rules
    Acl(AclArgs),

    /// Watch crawl status across appliances
    #[command(alias = "mon")]
    Monitor(MonitorArgs),

    /// Pause or resume crawling across appliances
    Crawl(CrawlArgs),

    /// Reset the index across appliances
    Index(IndexArgs),

    /// Set the crawl document limit across appliances
    DocLimit(DocLimitArgs),

    /// Inspect CLI configuration and store credentials
    Config(ConfigArgs),
}

// ── Feed commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RetrieveArgs {
    /// Feed name (e.g. config, status, policyAcls)
    pub feed: String,

    /// Entry id within the feed
    pub entry: Option<String>,

    /// Query parameter, repeatable (e.g. --query maxLines=10)
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct InsertArgs {
    pub feed: String,

    /// Atom entry document ("-" for stdin)
    #[arg(long, short = 'i')]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub feed: String,

    pub entry: String,

    /// Atom entry document ("-" for stdin)
    #[arg(long, short = 'i')]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub feed: String,

    pub entry: String,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ── ACL ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AclArgs {
    #[command(subcommand)]
    pub command: AclCommand,
}

#[derive(Debug, Subcommand)]
pub enum AclCommand {
    /// List every policy ACL rule
    #[command(alias = "ls")]
    List,

    /// Import rules from a file: one "<urlPattern> <acl>" per line
    Import {
        /// Rule file ("-" for stdin)
        #[arg(long, short = 'f')]
        file: PathBuf,

        /// Delete every existing rule before importing
        #[arg(long)]
        replace_all: bool,
    },
}

// ── Monitor ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Appliances as host, host:port or protocol://host:port
    /// [default: [monitor].hosts from config]
    pub hosts: Vec<String>,

    /// Seconds between the end of one refresh and the next
    #[arg(long)]
    pub interval: Option<u64>,

    /// Print one table after every appliance has refreshed once, then exit
    #[arg(long)]
    pub once: bool,
}

// ── Fleet commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FleetTargets {
    /// Appliances as host, host:port or protocol://host:port
    /// [default: [monitor].hosts from config, else the profile's appliance]
    pub hosts: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    #[command(subcommand)]
    pub command: CrawlCommand,
}

#[derive(Debug, Subcommand)]
pub enum CrawlCommand {
    /// Pause crawling
    Pause(FleetTargets),

    /// Resume crawling
    Resume(FleetTargets),
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[command(subcommand)]
    pub command: IndexCommand,
}

#[derive(Debug, Subcommand)]
pub enum IndexCommand {
    /// Drop the whole index (asks for confirmation)
    Reset(FleetTargets),
}

#[derive(Debug, Args)]
pub struct DocLimitArgs {
    #[command(subcommand)]
    pub command: DocLimitCommand,
}

#[derive(Debug, Subcommand)]
pub enum DocLimitCommand {
    /// Set the maximum number of URLs to crawl
    Set {
        max_urls: u64,

        #[command(flatten)]
        targets: FleetTargets,
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

    /// Print the effective configuration (passwords redacted)
    Show,

    /// Store the active profile's password in the system keyring
    SetPassword,
}
