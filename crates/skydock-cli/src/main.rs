//! Skydock command-line client.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use skydock_chat::ChatController;
use skydock_client::ApiClient;
use skydock_session::SessionCache;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "skydock", about = "Skydock — chat with your deployment platform")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "skydock.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage chat sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Open an interactive chat
    Chat {
        /// Session to resume (a new one is created when omitted)
        #[arg(short, long)]
        session: Option<Uuid>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List sessions
    List,
    /// Create a session
    New {
        /// Initial title
        #[arg(long)]
        title: Option<String>,
        /// Project to link the session to
        #[arg(long)]
        project: Option<Uuid>,
    },
    /// Delete a session
    Delete {
        /// Session id
        id: Uuid,
    },
}

#[derive(Deserialize, Default)]
struct SkydockConfig {
    #[serde(default = "default_api_url")]
    api_url: String,
    #[serde(default)]
    api_token: String,
}

fn default_api_url() -> String {
    "https://api.skydock.dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to read config file '{}': {}",
                cli.config.display(),
                e
            )
        })?;
        toml::from_str(&config_str)?
    } else {
        SkydockConfig::default()
    };
    if let Ok(token) = std::env::var("SKYDOCK_API_TOKEN") {
        config.api_token = token;
    }
    if config.api_token.is_empty() {
        anyhow::bail!("No API token: set api_token in skydock.toml or SKYDOCK_API_TOKEN");
    }

    let client = Arc::new(ApiClient::new(&config.api_url, &config.api_token));

    match cli.command {
        Commands::Sessions { action } => match action {
            SessionAction::List => {
                let sessions = client.list_sessions().await?;
                if sessions.is_empty() {
                    println!("No sessions.");
                } else {
                    for session in &sessions {
                        println!(
                            "{}  {}  {}",
                            session.id,
                            session.updated_at.format("%Y-%m-%d %H:%M"),
                            session.title
                        );
                    }
                    println!("\nTotal: {} session(s)", sessions.len());
                }
            }
            SessionAction::New { title, project } => {
                let session = client.create_session(title.as_deref(), project).await?;
                println!("Created session {} — {}", session.id, session.title);
            }
            SessionAction::Delete { id } => {
                client.delete_session(id).await?;
                println!("Deleted session {id}");
            }
        },
        Commands::Chat { session } => {
            run_chat(client, session).await?;
        }
    }

    Ok(())
}

async fn run_chat(client: Arc<ApiClient>, session: Option<Uuid>) -> anyhow::Result<()> {
    let cache = Arc::new(SessionCache::new(client.clone()));

    let session_id = match session {
        Some(id) => id,
        None => {
            let created = client.create_session(None, None).await?;
            println!("Started session {}", created.id);
            created.id
        }
    };

    let controller = Arc::new(ChatController::new(
        session_id,
        client.clone(),
        cache.clone(),
    ));

    if let Some(detail) = cache.session(session_id).await? {
        let history = detail.hydrate();
        for message in &history {
            print_message_header(&message.role);
            println!("{}", message.content);
        }
        controller.load_history(history);
        info!(session_id = %session_id, "loaded session history");
    }

    let renderer = tokio::spawn(render_updates(controller.clone()));

    println!("Type a message, /cancel to stop a reply, /quit to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nyou> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => {}
            "/quit" => break,
            "/cancel" => controller.cancel(),
            text => {
                controller.submit(text).await;
                controller.join_turn().await;
            }
        }
    }

    renderer.abort();
    Ok(())
}

fn print_message_header(role: &skydock_core::Role) {
    match role {
        skydock_core::Role::User => print!("\nyou> "),
        skydock_core::Role::Assistant => print!("\nassistant> "),
    }
}

/// Streams transcript updates to stdout: text deltas as they land, one
/// status line per tool call start and completion.
async fn render_updates(controller: Arc<ChatController>) {
    let mut revisions = controller.subscribe();
    let mut message_count = 0usize;
    let mut printed_bytes = 0usize;
    let mut announced_calls = 0usize;
    let mut finished_calls: HashSet<String> = HashSet::new();

    while revisions.changed().await.is_ok() {
        let transcript = controller.transcript();
        let transcript = transcript.lock();
        let Some(last) = transcript.last() else {
            continue;
        };

        if transcript.len() != message_count {
            message_count = transcript.len();
            printed_bytes = 0;
            announced_calls = 0;
            finished_calls.clear();
            if last.role == skydock_core::Role::Assistant {
                print!("\nassistant> ");
            }
        }

        if last.role != skydock_core::Role::Assistant {
            continue;
        }

        if last.content.len() > printed_bytes {
            print!("{}", &last.content[printed_bytes..]);
            printed_bytes = last.content.len();
        }

        for call in &last.tool_calls[announced_calls..] {
            print!("\n  [tool {} started]", call.name);
        }
        announced_calls = last.tool_calls.len();

        for call in &last.tool_calls {
            if call.status == skydock_core::ToolCallStatus::Done
                && !finished_calls.contains(&call.id)
            {
                finished_calls.insert(call.id.clone());
                print!("\n  [tool {} done]", call.name);
            }
        }

        let _ = std::io::stdout().flush();
    }
}
