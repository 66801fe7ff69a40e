//! Clientele CLI - database migrations and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! clientele-cli migrate
//!
//! # Delete every customer and product through the running server
//! # (asks for --yes; server from --server or CLIENTELE_SERVER_URL)
//! clientele-cli flush --yes
//!
//! # Print all customers as JSON
//! clientele-cli customers list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clientele-cli")]
#[command(author, version, about = "Clientele CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Delete all customers and products via the server's flush endpoint
    Flush {
        /// Confirm the irreversible deletion
        #[arg(long)]
        yes: bool,
        /// Server base URL [default: $CLIENTELE_SERVER_URL or http://127.0.0.1:8080]
        #[arg(long)]
        server: Option<String>,
    },
    /// Inspect customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Print every customer as JSON, newest ID first
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Flush { yes, server } => {
            let server = server.unwrap_or_else(commands::flush::server_url_from_env);
            commands::flush::run(&server, yes).await.map(drop)
        }
        Commands::Customers { action } => match action {
            CustomerAction::List => commands::customers::list().await,
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flush_flag() {
        let cli = Cli::try_parse_from(["clientele-cli", "flush", "--yes"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Flush {
                yes: true,
                server: None
            })
        ));

        let cli = Cli::try_parse_from(["clientele-cli", "flush"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Flush { yes: false, .. })
        ));

        let cli = Cli::try_parse_from([
            "clientele-cli",
            "flush",
            "--yes",
            "--server",
            "http://db-admin:8080",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Flush { server: Some(ref url), .. }) if url == "http://db-admin:8080"
        ));
    }
}
