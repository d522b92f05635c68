//! `taskers`: terminal kanban board.
//!
//! ```bash
//! # Interactive board on the default task document
//! taskers
//!
//! # Throwaway board, no confirmation prompts
//! taskers --store memory --no-confirm
//!
//! # Non-interactive transfer
//! taskers export backup.json
//! taskers import backup.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use taskers::app::App;
use taskers::config::{CliArgs, Command, Config, StoreTarget};
use taskers::controller::{BoardController, Outcome};
use taskers::kanban_board::KanbanBoard;
use taskers::repository::TaskRepository;
use taskers::store::{InMemoryTaskStore, JsonFileTaskStore, TaskStore};
use taskers::transfer::export_all;
use taskers::ui;

type Store = Arc<dyn TaskStore>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli).context("loading configuration")?;

    // Logs go to a file: the board owns the terminal.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let store: Store = match &config.store {
        StoreTarget::Memory => Arc::new(InMemoryTaskStore::new()),
        StoreTarget::File(path) => Arc::new(JsonFileTaskStore::new(path)),
    };
    tracing::info!(store = ?config.store, "taskers starting");

    let repository = Arc::new(TaskRepository::new(store));
    let controller = BoardController::new(Arc::clone(&repository))
        .with_confirmation(config.confirm_destructive);

    match cli.command {
        Some(Command::Export { output }) => {
            let output = output.unwrap_or_else(|| config.export_path.clone());
            export_command(&repository, &output).await
        }
        Some(Command::Import { input }) => import_command(&controller, &input).await,
        None => run_board(&config, &controller).await,
    }
}

fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskers.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn export_command(repository: &TaskRepository<Store>, output: &Path) -> Result<()> {
    let tasks = repository
        .store()
        .get_all()
        .await
        .context("reading tasks from the store")?;
    let text = export_all(&tasks)?;
    tokio::fs::write(output, text)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Exported {} tasks to {}", tasks.len(), output.display());
    Ok(())
}

async fn import_command(controller: &BoardController<Store>, input: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let mut board = KanbanBoard::new();
    let outcome = controller
        .import(&mut board, &raw)
        .await
        .with_context(|| format!("importing {}", input.display()))?;
    if let Outcome::SaveFailed(err) = outcome {
        return Err(err).context("saving imported tasks");
    }
    println!("Imported {} tasks from {}", board.len(), input.display());
    Ok(())
}

async fn run_board(config: &Config, controller: &BoardController<Store>) -> Result<()> {
    let loaded = controller.repository().load().await;
    let mut app = App::new(KanbanBoard::with_tasks(loaded.tasks.clone()))
        .with_confirmation(config.confirm_destructive)
        .with_export_path(config.export_path.clone());
    if let Some(warning) = loaded.warning() {
        app.warn(warning);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, controller, config).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!("taskers exiting");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    controller: &BoardController<Store>,
    config: &Config,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.set_area(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(config.poll_timeout)? {
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => None,
            };
            if let Some(action) = action {
                app.apply(action, controller).await;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
