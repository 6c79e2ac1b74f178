use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ClientEvent, DocChatClient, SelectedDocument, SessionSnapshot,
    SettingsOverrides,
};
use shared::domain::PDF_MEDIA_TYPE;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast, watch},
    task::JoinSet,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_line, Command, HELP};
use render::{render_changes, render_status};

#[derive(Parser, Debug)]
#[command(name = "docchat", about = "Upload a PDF and ask questions about it")]
struct Args {
    /// Config file (defaults to ./docchat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long)]
    api_base_url: Option<String>,
    /// Document to select on startup
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = load_settings(&SettingsOverrides {
        config_path: args.config,
        api_base_url: args.api_base_url,
    })
    .context("failed to load client configuration")?;
    info!(
        api_base_url = %config.api_base_url,
        inflight_policy = ?config.inflight_policy,
        "starting docchat"
    );

    let client = DocChatClient::new(&config).context("failed to build backend client")?;
    let renderer = tokio::spawn(render_loop(client.subscribe()));
    let prompts = tokio::spawn(prompt_loop(client.subscribe_events()));

    if let Some(path) = &args.file {
        open_document(&client, path).await;
    }
    println!("{HELP}");

    let mut requests = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_line(&line) {
            Command::Quit => {
                quit = true;
                break;
            }
            Command::Help => println!("{HELP}"),
            Command::Invalid(message) => println!("{message}"),
            Command::Status => println!("{}", render_status(&client.snapshot())),
            Command::Open(path) => open_document(&client, &path).await,
            Command::Upload => {
                let client = Arc::clone(&client);
                requests.spawn(async move {
                    if let Err(err) = client.upload().await {
                        debug!(kind = ?err.kind(), "upload not submitted");
                    }
                });
            }
            Command::Ask(text) => {
                if let Some(text) = text {
                    client.set_question(text);
                }
                let client = Arc::clone(&client);
                requests.spawn(async move { client.ask().await });
            }
            Command::Question(text) => {
                client.set_question(text);
                let client = Arc::clone(&client);
                requests.spawn(async move { client.ask().await });
            }
        }
    }

    if quit {
        // Request tasks spawned by the controllers may still hold the
        // session, so the listeners are stopped rather than drained.
        requests.abort_all();
        renderer.abort();
        prompts.abort();
        return Ok(());
    }

    // End of input: let pending requests land, then drop the last client
    // handle so both listeners drain and exit.
    while requests.join_next().await.is_some() {}
    drop(client);
    let _ = renderer.await;
    let _ = prompts.await;
    Ok(())
}

async fn open_document(client: &DocChatClient, path: &Path) {
    match SelectedDocument::from_path(path).await {
        Ok(document) => {
            if document.media_type() != PDF_MEDIA_TYPE {
                println!(
                    "note: {} is {}, the backend expects a PDF",
                    document.name(),
                    document.media_type()
                );
            }
            client.select_document(document);
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not open document");
            println!("Could not open {}", path.display());
        }
    }
}

async fn render_loop(mut rx: watch::Receiver<SessionSnapshot>) {
    let mut previous = rx.borrow_and_update().clone();
    while rx.changed().await.is_ok() {
        let current = rx.borrow_and_update().clone();
        for line in render_changes(&previous, &current) {
            println!("{line}");
        }
        previous = current;
    }
}

async fn prompt_loop(mut rx: broadcast::Receiver<ClientEvent>) {
    loop {
        match rx.recv().await {
            Ok(ClientEvent::Prompt(text)) => println!("! {text}"),
            Ok(ClientEvent::RequestFailed { kind }) if kind.is_transport() => {
                warn!(?kind, "backend request failed");
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "prompt listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
