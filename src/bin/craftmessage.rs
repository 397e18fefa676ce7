//! Administrative command-line interface for the message store.
//!
//! ```text
//! craftmessage [--config database.properties] <command>
//! ```
//!
//! Every command prints JSON lines to stdout; logs go to stderr and are
//! filtered with `CRAFTMESSAGE_LOG`. A `.env` file in the working directory is
//! loaded first, so it may carry the log filter and the
//! `CRAFTMESSAGE_DATABASE_*` overrides.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use craftmessage::config::{DEFAULT_PROPERTIES_FILE, StoreConfig};
use craftmessage::message::domain::{MessageId, NewMessage, PlayerId};
use craftmessage::message::services::MessageService;
use craftmessage::store::{PgStoreConnector, StoreHandle, StoreOutcome};
use craftmessage::telemetry;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "craftmessage")]
#[command(about = "Inspect and manage stored player messages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the database properties file.
    #[arg(short, long, default_value = DEFAULT_PROPERTIES_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the store and report its state.
    Status,
    /// Print the number of stored messages.
    Count,
    /// List messages, newest first.
    List {
        /// Only list messages from this player.
        #[arg(short, long)]
        player: Option<PlayerId>,
    },
    /// Print one message.
    Show {
        /// Message identifier.
        id: i64,
    },
    /// Delete one message.
    Delete {
        /// Message identifier.
        id: i64,
    },
    /// Store a message on behalf of a player.
    Submit {
        /// Player UUID in hyphenated form.
        player: String,
        /// Message text, at most 256 characters.
        text: String,
    },
}

#[derive(Serialize)]
struct Status<'a> {
    state: &'a str,
    available: bool,
    messages: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    telemetry::init_tracing()?;
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "ignoring unreadable environment file"),
    }
    let cli = Cli::parse();

    let config = StoreConfig::load(&cli.config);
    let handle = Arc::new(StoreHandle::new(config, Arc::new(PgStoreConnector::new())));
    let service = MessageService::new(handle);

    let result = run(&service, cli.command).await;
    service.close().await;
    result
}

async fn run(service: &MessageService, command: Commands) -> Result<()> {
    match command {
        Commands::Status => {
            let available = service.is_available().await;
            let messages = if available {
                service.fetch_count().await.into_option()
            } else {
                None
            };
            emit(&Status {
                state: service.state().as_str(),
                available,
                messages,
            })
        }
        Commands::Count => {
            let total = require(service.fetch_count().await, "count")?;
            emit(&serde_json::json!({ "count": total }))
        }
        Commands::List { player } => {
            let messages = match player {
                Some(player_id) => service.fetch_for_player(player_id).await,
                None => service.fetch_all().await,
            };
            for message in require(messages, "list")? {
                emit(&message)?;
            }
            Ok(())
        }
        Commands::Show { id } => {
            let Some(message) = require(service.fetch(MessageId::new(id)).await, "show")? else {
                bail!("message {id} not found");
            };
            emit(&message)
        }
        Commands::Delete { id } => {
            let deleted = require(service.remove(MessageId::new(id)).await, "delete")?;
            emit(&serde_json::json!({ "id": id, "deleted": deleted }))
        }
        Commands::Submit { player, text } => {
            let message = NewMessage::parse(&player, text).context("invalid submission")?;
            let stored = require(service.save(message).await, "submit")?;
            emit(&stored)
        }
    }
}

fn require<T>(outcome: StoreOutcome<T>, operation: &str) -> Result<T> {
    match outcome {
        StoreOutcome::Ok(value) => Ok(value),
        StoreOutcome::Unavailable => bail!("{operation}: message store is unavailable"),
        StoreOutcome::TransientFailure => {
            bail!("{operation}: connection to the message store was lost")
        }
        StoreOutcome::Failed => bail!("{operation}: message store operation failed"),
    }
}

fn emit(value: &impl Serialize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).context("failed to serialize output")?;
    writeln!(stdout).context("failed to write output")?;
    Ok(())
}
