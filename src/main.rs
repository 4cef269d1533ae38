use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod app;
mod completion;
mod config;
mod handler;
mod markup;
mod tui;
mod ui;

use app::App;
use completion::{CompletionService, HttpCompletionService};
use config::Config;

#[derive(Parser)]
#[command(name = "banter")]
#[command(about = "Chat with a generative AI text model from the terminal")]
struct Cli {
    /// Completion service endpoint (Ollama-compatible)
    #[arg(long)]
    endpoint: Option<String>,

    /// Model to chat with
    #[arg(short, long)]
    model: Option<String>,

    /// Persist the chosen endpoint and model as defaults
    #[arg(long)]
    save: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List models available at the endpoint
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());

    let endpoint = cli
        .endpoint
        .as_deref()
        .unwrap_or_else(|| config.endpoint())
        .to_string();
    let model = cli
        .model
        .as_deref()
        .unwrap_or_else(|| config.model())
        .to_string();

    if cli.save {
        let mut config = config.clone();
        config.endpoint = Some(endpoint.clone());
        config.default_model = Some(model.clone());
        config.save()?;
    }

    let service = HttpCompletionService::new(&endpoint, &model, config.timeout())?;

    match cli.command {
        Some(Commands::Models) => list_models(&service, &endpoint).await,
        None => run_chat(service, model).await,
    }
}

async fn list_models(service: &HttpCompletionService, endpoint: &str) -> Result<()> {
    let models = service.list_models().await?;

    if models.is_empty() {
        println!("No models found at {}", endpoint);
    } else {
        for model in models {
            println!("{}", model);
        }
    }

    Ok(())
}

async fn run_chat(service: HttpCompletionService, model: String) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let service: Arc<dyn CompletionService> = Arc::new(service);
    let mut app = App::new(service, model);

    let result = run_loop(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
