use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storevault::cli::{handle_backup_command, handle_store_command, BackupCommands, StoreCommands};
use storevault::config::{paths::StorePaths, settings::Settings};
use storevault::storage::Storage;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "STOREVAULT_LOG";

#[derive(Parser)]
#[command(
    name = "storevault",
    version,
    about = "Backup export and restore for a storefront store",
    long_about = "Storevault snapshots storefront collections (categories, products, \
                  customers, settings) into portable JSON backups and restores them \
                  with an explicit conflict strategy and a preview mode."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Entity store commands
    #[command(subcommand)]
    Store(StoreCommands),

    /// Show current configuration and paths
    Config,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = StorePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    let storage = Storage::open(paths.clone())?;

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Store(cmd)) => {
            handle_store_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Config) => {
            println!("Storevault Configuration");
            println!("========================");
            println!("Base directory:     {}", paths.base_dir().display());
            println!("Data directory:     {}", paths.data_dir().display());
            println!("Artifact directory: {}", paths.artifact_dir().display());
            println!("Activity log:       {}", paths.activity_log().display());
            println!();
            println!("Settings:");
            println!("  Restore timeout:   {}s", settings.restore_timeout_secs);
            println!("  Conflict strategy: {}", settings.default_conflict_strategy);
            println!(
                "  Scheduled backups kept: {}",
                settings.backup_retention.scheduled_count
            );
            println!("  Log level:         {}", settings.log_level);
            println!("  Default actor:     {}", settings.default_actor);
        }
        None => {
            println!("Storevault - storefront backup and restore");
            println!();
            println!("Run 'storevault --help' for usage information.");
        }
    }

    Ok(())
}
