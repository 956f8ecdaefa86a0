use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "servingctl", bin_name = "servingctl", version = get_version())]
#[command(about = "Manage serving resources in a cluster or a gitops directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Namespace to operate in (defaults to the configured namespace, then "default")
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Storage root for gitops mode
    #[arg(long, global = true, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Diagnostic level (error, warn, info, debug, trace); overrides -v
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Output format
    #[arg(
        short,
        long,
        global = true,
        value_parser = PossibleValuesParser::new(["table", "yaml", "json"])
    )]
    pub output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage services
    #[command(subcommand, alias = "ksvc")]
    Service(ServiceCommand),

    /// Manage revisions
    #[command(subcommand, alias = "rev")]
    Revision(RevisionCommand),

    /// Inspect routes
    #[command(subcommand)]
    Route(RouteCommand),

    /// Get or set configuration
    Config {
        /// Configuration key (target, namespace, output, update-retries, wait-timeout)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Create a service
    Create {
        name: String,

        /// Container image
        #[arg(long)]
        image: String,

        /// Environment variable (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Label (repeatable)
        #[arg(short, long = "label", value_name = "KEY=VALUE")]
        labels: Vec<String>,

        /// Replace the service if it already exists
        #[arg(long)]
        force: bool,

        /// Wait until the service is ready
        #[arg(long)]
        wait: bool,
    },

    /// Update a service
    Update {
        name: String,

        /// Container image
        #[arg(long)]
        image: Option<String>,

        /// Environment variable (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Label (repeatable)
        #[arg(short, long = "label", value_name = "KEY=VALUE")]
        labels: Vec<String>,

        /// Wait until the service is ready
        #[arg(long)]
        wait: bool,
    },

    /// Show a service
    Describe { name: String },

    /// List services
    #[command(alias = "ls")]
    List {
        /// List across all namespaces
        #[arg(short = 'A', long)]
        all_namespaces: bool,

        /// Only services with this label (repeatable)
        #[arg(short, long = "label", value_name = "KEY=VALUE")]
        labels: Vec<String>,
    },

    /// Delete one or more services
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,

        /// Wait until each service is gone
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RevisionCommand {
    /// List revisions
    #[command(alias = "ls")]
    List {
        #[arg(short = 'A', long)]
        all_namespaces: bool,
    },

    /// Show a revision
    Describe { name: String },

    /// Delete one or more revisions
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,

        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// List routes
    #[command(alias = "ls")]
    List {
        #[arg(short = 'A', long)]
        all_namespaces: bool,
    },

    /// Show a route
    Describe { name: String },
}
