//! CLI command execution.
//!
//! Every command builds the same stack: config, API client, chat service and
//! store. One-shot commands print and exit; `chat` runs the interactive loop.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;

use crate::api::{ApiClient, AuthService, HttpChatService, TokenStore};
use crate::config::Config;
use crate::store::ChatStore;
use crate::view::{render, ChatInterface, Notice, Output};

use super::args::{Cli, Commands};

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            Config::load_from(path, dir)
        }
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(url) = &cli.api_url {
        config.set_api_base_url(url);
    }
    Ok(config)
}

/// Shared client stack for one invocation.
struct App {
    config: Config,
    client: Arc<ApiClient>,
    store: Arc<ChatStore>,
}

impl App {
    fn build(config: Config) -> Result<Self> {
        let tokens = TokenStore::new(&config.token_path);
        let client = ApiClient::new(&config.api_base_url, tokens, config.request_timeout)
            .context("Failed to build HTTP client")?;
        let client = Arc::new(client);
        let service = Arc::new(HttpChatService::new(client.clone()));
        let store = Arc::new(ChatStore::new(service));
        Ok(Self {
            config,
            client,
            store,
        })
    }

    fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    fn require_login(&self) -> Result<()> {
        if !self.auth().is_logged_in()? {
            bail!("Not logged in. Run `stellecta login --email <EMAIL>` first.");
        }
        Ok(())
    }
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!(api = %config.api_base_url, "configuration loaded");
    let app = App::build(config)?;

    match cli.command {
        Commands::Login { email, password } => login(&app, &email, password).await,
        Commands::Logout => {
            app.auth().logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => whoami(&app).await,
        Commands::Mentors => list_mentors(&app).await,
        Commands::Sessions { limit } => {
            let limit = limit.unwrap_or(app.config.session_limit);
            list_sessions(&app, limit).await
        }
        Commands::Messages { session_id } => list_messages(&app, &session_id).await,
        Commands::Send {
            mentor,
            session,
            message,
        } => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                bail!("Message is required for send command");
            }
            send_once(&app, &mentor, session.as_deref(), &message).await
        }
        Commands::Chat { mentor, session } => {
            run_chat(&app, mentor.as_deref(), session.as_deref()).await
        }
    }
}

async fn read_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("Failed to read password")?
        .context("No password given")?;
    Ok(line)
}

async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password().await?,
    };
    let user = app
        .auth()
        .login(email, &password)
        .await
        .context("Login failed")?;

    let name = user.full_name.as_deref().unwrap_or(&user.email);
    match user.role.as_deref() {
        Some(role) => println!("Logged in as {name} ({role})."),
        None => println!("Logged in as {name}."),
    }
    Ok(())
}

async fn whoami(app: &App) -> Result<()> {
    app.require_login()?;
    let user = app
        .auth()
        .current_user()
        .await
        .context("Failed to fetch current user")?;
    println!("{}", user.email);
    if let Some(name) = user.full_name {
        println!("Name: {name}");
    }
    if let Some(role) = user.role {
        println!("Role: {role}");
    }
    Ok(())
}

async fn list_mentors(app: &App) -> Result<()> {
    app.require_login()?;
    app.store.load_mentors().await?;
    let state = app.store.snapshot().await;

    if state.mentors.is_empty() {
        println!("No mentors available.");
        return Ok(());
    }

    println!("{:<10} {:<3} {:<16} {}", "ID", "", "NAME", "SUBJECT");
    println!("{}", "-".repeat(50));
    for mentor in &state.mentors {
        println!(
            "{:<10} {:<3} {:<16} {}",
            mentor.id, mentor.icon, mentor.name, mentor.subject
        );
    }
    Ok(())
}

async fn list_sessions(app: &App, limit: usize) -> Result<()> {
    app.require_login()?;
    app.store.load_sessions(limit).await?;
    let _ = app.store.load_mentors().await;
    let state = app.store.snapshot().await;

    if state.sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<10} {:<18} {:>5} {:>6}  {}",
        "ID", "MENTOR", "SUBJECT", "MSGS", "XP", "STARTED"
    );
    println!("{}", "-".repeat(96));
    for session in &state.sessions {
        let subject = if session.subject.len() > 16 {
            format!("{}...", session.subject.chars().take(13).collect::<String>())
        } else {
            session.subject.clone()
        };
        println!(
            "{:<38} {:<10} {:<18} {:>5} {:>6}  {}{}",
            session.id,
            session.mentor_id,
            subject,
            session.message_count,
            session.total_xp_earned,
            session.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            if session.is_active { " *" } else { "" },
        );
    }
    Ok(())
}

async fn list_messages(app: &App, session_id: &str) -> Result<()> {
    app.require_login()?;
    let _ = app.store.load_mentors().await;
    app.store.load_session_messages(session_id).await?;
    let state = app.store.snapshot().await;

    if state.messages.is_empty() {
        println!("No messages found for session {session_id}.");
        return Ok(());
    }
    for block in render::transcript(&state) {
        println!("{block}\n");
    }
    Ok(())
}

async fn send_once(
    app: &App,
    mentor: &str,
    session: Option<&str>,
    message: &str,
) -> Result<()> {
    app.require_login()?;
    let _ = app.store.load_mentors().await;
    match session {
        Some(session_id) => app.store.set_current_session(session_id, mentor).await,
        None => app.store.select_mentor(mentor).await,
    }

    let reply = app.store.send_message(message, Some(mentor)).await?;
    let state = app.store.snapshot().await;

    if let Some(answer) = state.messages.iter().find(|m| m.id == reply.message_id) {
        println!("{}", render::message(answer, &state));
    }
    if reply.xp_earned > 0 {
        println!("\n{}", Notice::XpEarned(reply.xp_earned));
    }
    println!("{}", render::progress(&state.progress));
    println!("Session: {}", reply.session_id);
    Ok(())
}

fn print_output(output: &Output) {
    for line in &output.lines {
        println!("{line}");
    }
}

fn print_prompt(prompt: &str) -> Result<()> {
    print!("{prompt}");
    std::io::stdout().flush().context("Failed to write prompt")
}

async fn run_chat(app: &App, mentor: Option<&str>, session: Option<&str>) -> Result<()> {
    app.require_login()?;

    let (mut ui, mut finished) = ChatInterface::new(
        app.store.clone(),
        app.config.session_limit,
        app.config.xp_notification,
    );
    print_output(&ui.start(mentor, session).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut changes = app.store.changes();
    // Prompt currently on screen; empty after any output.
    let mut shown = String::new();
    loop {
        let prompt = ui.prompt().await;
        if prompt != shown {
            if !shown.is_empty() {
                print!("\r");
            }
            print_prompt(&prompt)?;
            shown = prompt;
        }
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    println!();
                    break;
                };
                let output = ui.handle_line(&line).await;
                print_output(&output);
                if output.quit {
                    break;
                }
                shown.clear();
            }
            Some(done) = finished.recv() => {
                println!();
                print_output(&ui.finish_send(done).await);
                shown.clear();
            }
            Some(_) = changes.next() => {}
        }
    }
    Ok(())
}
