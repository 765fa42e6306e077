use tracing_subscriber::EnvFilter;

use telcome_api::TelcomeClient;
use telcome_session::{FileStorage, SessionStore};
use telcome_tui::events::EventHandler;
use telcome_tui::{App, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.config_dir)?;

    // Log to a file; stdout belongs to the terminal UI.
    let log_file = std::fs::File::options()
        .create(true)
        .append(true)
        .open(config.config_dir.join("telcome.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let session = SessionStore::new(FileStorage::with_dir(&config.config_dir));
    session.restore().await;
    let client = TelcomeClient::new(&config.api_url)?;

    let mut event_handler = EventHandler::new(250);
    let mut app = App::new(session, client, config.page_size, event_handler.sender());

    run_terminal(&mut app, &mut event_handler).await
}

async fn run_terminal(
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    use crossterm::{execute, terminal};

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    // Run the application with proper cleanup
    let result = app.run(&mut terminal, event_handler).await;

    // Always restore terminal, even if there was an error
    let cleanup_result = (|| -> Result<(), Box<dyn std::error::Error>> {
        terminal::disable_raw_mode()?;
        execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
        Ok(())
    })();

    if let Err(cleanup_error) = cleanup_result {
        eprintln!("Terminal cleanup error: {}", cleanup_error);
    }
    if let Err(e) = result {
        eprintln!("Telcome error: {}", e);
    }
    Ok(())
}
