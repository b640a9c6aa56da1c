use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use chatsensei_core::{
    Backend, ChatAssistant, Config, FeedbackMark, FeedbackRequest, Style, SuggestClient, View,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "chatsensei")]
#[command(about = "Reply suggestions for chat messages, backed by a ChatSensei server")]
struct Cli {
    /// Suggestion server URL (overrides CHATSENSEI_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (default)
    Tui,
    /// Analyze a chat message once and print the suggestions
    Suggest {
        /// Chat content to analyze
        chat: String,
    },
    /// Send feedback for a style and print the updated weights
    Feedback {
        /// polite, funny or straightforward
        style: String,
        /// Mark the suggestion as bad instead of good
        #[arg(long)]
        bad: bool,
    },
    /// Show or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Store the suggestion server URL
    SetUrl { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let server_url = config.resolve_server_url(cli.url.as_deref());

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            init_file_logging(&config);
            tracing::info!(%server_url, "starting TUI");
            let backend = Arc::new(SuggestClient::new(&server_url));
            run_tui(ChatAssistant::new(backend)).await?
        }
        Commands::Suggest { chat } => {
            init_stderr_logging();
            suggest_once(&server_url, &chat).await?
        }
        Commands::Feedback { style, bad } => {
            init_stderr_logging();
            feedback_once(&server_url, &style, !bad).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => show_config(&config, &server_url)?,
            ConfigAction::SetUrl { url } => {
                Config::save_server_url(&url)?;
                println!("{} {}", "✓ Server URL saved:".green(), url.bold());
            }
        },
    }

    Ok(())
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// The TUI draws on the terminal, so logs go to a file instead.
fn init_file_logging(config: &Config) {
    let Some(path) = config.resolve_log_file() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_tui(assistant: ChatAssistant) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(assistant);

    // Restore the terminal regardless of whether the loop succeeded
    let result = event_loop(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;

    tracing::info!("TUI exited");
    result
}

async fn event_loop(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    let tx = events.sender();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event, &tx)?,
            None => break,
        }
    }

    Ok(())
}

async fn suggest_once(server_url: &str, chat: &str) -> Result<()> {
    let backend = Arc::new(SuggestClient::new(server_url));
    let mut assistant = ChatAssistant::new(backend);
    assistant.set_input(chat);

    println!("🔍 Analyzing with {}...\n", server_url.cyan());

    if assistant.analyze().await.is_err() {
        let view = assistant.view();
        println!("{}", view.error.message.red());
        return Err(anyhow!("analysis failed"));
    }

    print_results(assistant.view());
    Ok(())
}

fn print_results(view: &View) {
    if let Some(tone) = &view.results.tone {
        println!("{}\n", tone.badge_text().bold().blue());
    }

    for card in &view.results.cards {
        println!("{}", card.heading.bold().yellow());
        println!("   {}\n", card.text);
    }

    print_weights(view);
}

fn print_weights(view: &View) {
    println!("{}", "Preference weights:".bold().green());
    for style in Style::all() {
        println!("  • {} {}", style.heading(), view.weight(style).bold());
    }
}

async fn feedback_once(server_url: &str, style: &str, good: bool) -> Result<()> {
    let chosen_style = Style::from_str(style)
        .ok_or_else(|| anyhow!("unknown style '{}', expected polite, funny or straightforward", style))?;

    let client = SuggestClient::new(server_url);
    let request = FeedbackRequest { chosen_style, good };

    match client.feedback(&request).await {
        Ok(response) => {
            println!("{}\n", FeedbackMark::from_good(good).note().green());
            println!("{}", "Preference weights:".bold().green());
            for style in Style::all() {
                println!(
                    "  • {} {}",
                    style.heading(),
                    response.preferences.display(style).bold()
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", format!("反馈提交失败: {}", e).red());
            Err(anyhow!("feedback failed"))
        }
    }
}

fn show_config(config: &Config, server_url: &str) -> Result<()> {
    let path = Config::get_config_path()?;

    println!("\n{}", "⚙️  ChatSensei configuration".bold().blue());
    println!("{}", "=".repeat(30).dimmed());
    println!("  Config file: {}", path.display().to_string().dimmed());
    println!("  Server URL:  {}", server_url.green());
    match config.resolve_log_file() {
        Some(log) => println!("  Log file:    {}", log.display().to_string().dimmed()),
        None => println!("  Log file:    {}", "disabled".dimmed()),
    }

    Ok(())
}
