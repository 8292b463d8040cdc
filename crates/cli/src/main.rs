//! `libris`: run the server or manage the catalog snapshot from the shell.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use libris_app::catalog;
use libris_authz::{CredentialService, Registration};
use libris_db::Store;
use libris_kernel::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(about = "Library catalog and lending service")]
struct Cli {
    /// Snapshot file to operate on; overrides `database.snapshot_path`
    #[arg(long, global = true, env = "LIBRIS_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Keep info-level logs for one-shot commands
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Manage administrator accounts
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Inspect books
    #[command(subcommand)]
    Books(ListCommand),
    /// Inspect readers
    #[command(subcommand)]
    Readers(ListCommand),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an administrator account
    Register(RegisterArgs),
    /// Check a username/password pair
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "LIBRIS_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    last_name: String,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "LIBRIS_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    /// Print every record
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    if let Some(path) = cli.snapshot.clone() {
        settings.database.snapshot_path = Some(path);
    }
    if !cli.verbose && !matches!(cli.command, Command::Serve) {
        settings.telemetry.filter = "warn".to_string();
    }
    libris_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => libris_app::serve(settings).await,
        Command::Admin(command) => run_admin(&settings, command).await,
        Command::Books(ListCommand::List) => list_books(&settings).await,
        Command::Readers(ListCommand::List) => list_readers(&settings).await,
    }
}

async fn open_store(settings: &Settings) -> anyhow::Result<Arc<Store>> {
    let store = Store::open(&settings.database)
        .await
        .context("failed to open entity store")?;
    Ok(Arc::new(store))
}

async fn run_admin(settings: &Settings, command: AdminCommand) -> anyhow::Result<()> {
    let store = open_store(settings).await?;
    let credentials = CredentialService::new(store.clone());

    match command {
        AdminCommand::Register(args) => {
            anyhow::ensure!(
                store.snapshot_path().is_some(),
                "no snapshot file configured; pass --snapshot or set LIBRIS_DATABASE__SNAPSHOT_PATH"
            );
            let admin = credentials
                .register(Registration {
                    username: args.username,
                    password: args.password,
                    name: args.name,
                    last_name: args.last_name,
                })
                .await
                .context("registration failed")?;
            println!("registered administrator {} (id {})", admin.username, admin.id);
        }
        AdminCommand::Verify(args) => {
            let admin = credentials
                .authenticate(&args.username, &args.password)
                .await
                .context("verification failed")?;
            println!("credentials valid for {}", admin.username);
        }
    }
    Ok(())
}

async fn list_books(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings).await?;
    let books = store.read(|tables| catalog::list_books(tables)).await;

    for book in books {
        let holder = book
            .holder()
            .map(|reader| reader.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            book.id, book.title, book.author, book.release_year, book.genre, holder
        );
    }
    Ok(())
}

async fn list_readers(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings).await?;
    let readers = store.read(|tables| catalog::list_readers(tables)).await;

    for reader in readers {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            reader.id, reader.name, reader.last_name, reader.address, reader.phone_number
        );
    }
    Ok(())
}
