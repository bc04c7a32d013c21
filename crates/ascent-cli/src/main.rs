mod cmd;
mod data_dir;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    assess::AssessSubcommand, config::ConfigSubcommand, practice::PracticeSubcommand,
    session::SessionSubcommand, subscription::SubscriptionSubcommand,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "ascent",
    about = "Stage-progression engine for practice-based coaching programs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data directory (default: auto-detect .ascent/ upward from cwd)
    #[arg(long, global = true, env = "ASCENT_DATA")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data directory with a default config and empty database
    Init {
        /// Program name recorded in the config (default: parent directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Run the HTTP API
    Serve {
        /// Bind address (overrides the config)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides the config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Enroll a user at stage 1
    Enroll {
        /// User id (omit to generate one)
        user: Option<Uuid>,
    },

    /// Log and list practice entries
    Practice {
        #[command(subcommand)]
        subcommand: PracticeSubcommand,
    },

    /// Show a user's progress and the next stage's unlock criteria
    Progress { user: Uuid },

    /// Attempt a stage unlock
    Unlock {
        user: Uuid,
        /// Target stage (must be the current stage plus one)
        target: u8,
    },

    /// Record assessments and show movement since baseline
    Assess {
        #[command(subcommand)]
        subcommand: AssessSubcommand,
    },

    /// Manage subscription records
    Subscription {
        #[command(subcommand)]
        subcommand: SubscriptionSubcommand,
    },

    /// Issue API session tokens
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
    },

    /// List a user's stage-unlock audit trail
    Events { user: Uuid },

    /// Validate and inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let data_dir = data_dir::resolve_data_dir(cli.data_dir.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&data_dir, name.as_deref()),
        Commands::Serve { bind, port } => cmd::serve::run(&data_dir, bind.as_deref(), port),
        Commands::Enroll { user } => cmd::enroll::run(&data_dir, user, cli.json),
        Commands::Practice { subcommand } => cmd::practice::run(&data_dir, subcommand, cli.json),
        Commands::Progress { user } => cmd::progress::run(&data_dir, user, cli.json),
        Commands::Unlock { user, target } => cmd::unlock::run(&data_dir, user, target, cli.json),
        Commands::Assess { subcommand } => cmd::assess::run(&data_dir, subcommand, cli.json),
        Commands::Subscription { subcommand } => {
            cmd::subscription::run(&data_dir, subcommand, cli.json)
        }
        Commands::Session { subcommand } => cmd::session::run(&data_dir, subcommand, cli.json),
        Commands::Events { user } => cmd::events::run(&data_dir, user, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&data_dir, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
