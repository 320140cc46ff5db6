mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Deploy serverless services from a declarative manifest", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the manifest and reconcile every resource
    Deploy {
        /// Redeploy only this function and its routes/triggers
        #[arg(short = 'f', long)]
        function: Option<String>,
    },
    /// Remove deployed resources in reverse dependency order
    Remove {
        /// Also detach and delete the exec and invoke roles
        #[arg(long)]
        remove_roles: bool,
        /// Also delete the log project, store and index
        #[arg(long)]
        remove_logstore: bool,
        /// Run without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the deployed service, its functions and routes
    Info,
    /// Invoke a deployed function and print its response
    Invoke {
        /// Function name from the manifest
        function: String,
        /// JSON payload passed to the function
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    /// Show recent function logs
    Logs {
        /// Only show logs for this function
        function: Option<String>,
        /// Number of log lines to fetch
        #[arg(short = 'l', long, default_value = "100")]
        lines: usize,
    },
    /// Compile the manifest and validate the resulting graphs
    Validate,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    // Version needs no manifest
    if matches!(cli.command, Commands::Version) {
        println!("stratus {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let project_root = stratus_core::find_project_root()?;
    let manifest = stratus_core::load_manifest(&project_root)?;

    match cli.command {
        Commands::Deploy { function } => {
            commands::deploy::handle(&manifest, &project_root, function).await?;
        }
        Commands::Remove {
            remove_roles,
            remove_logstore,
            yes,
        } => {
            commands::remove::handle(&manifest, &project_root, remove_roles, remove_logstore, yes)
                .await?;
        }
        Commands::Info => {
            commands::info::handle(&manifest, &project_root).await?;
        }
        Commands::Invoke { function, data } => {
            commands::invoke::handle(&manifest, &project_root, &function, &data).await?;
        }
        Commands::Logs { function, lines } => {
            commands::logs::handle(&manifest, &project_root, function.as_deref(), lines).await?;
        }
        Commands::Validate => {
            commands::validate::handle(&manifest)?;
        }
        Commands::Version => {
            unreachable!("Version is handled before manifest loading");
        }
    }

    Ok(())
}
