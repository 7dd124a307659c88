mod app;
mod clipboard;
mod model;
mod msg;
mod registry;

use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use app::App;
use clipboard::SystemClipboard;
use model::config::AppConfig;
use msg::Msg;
use registry::{FixtureSource, HttpRegistry, RegistryClient};

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "yoapi-plugins")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("yoapi-plugins"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "yoapi-plugins.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("yoapi_plugins={}", config.log.level)));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        "yoapi-plugins starting (registry: {}, fixture: {})",
        config.registry.base_url,
        config.registry.use_fixture_data
    );

    let remote = HttpRegistry::new(&config.registry.base_url, config.request_timeout())?;
    let registry = RegistryClient::new(Arc::new(remote), FixtureSource::default());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config, registry);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("fatal: {e:?}");
        eprintln!("yoapi-plugins error: {e:?}");
    }

    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: AppConfig,
    registry: RegistryClient,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let mut app = App::new(
        config,
        tx.clone(),
        registry,
        Box::new(SystemClipboard::default()),
    );

    let size = terminal.size()?;
    app.update(Msg::Resize(size.width, size.height))?;

    // Input thread: reads terminal events and forwards as Msg
    let tx_input = tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event) = event::read() {
                let msg = match event {
                    Event::Key(k) if k.kind == event::KeyEventKind::Press => Msg::Key(k),
                    Event::Resize(w, h) => Msg::Resize(w, h),
                    _ => continue,
                };
                if tx_input.send(msg).is_err() {
                    break;
                }
            }
        }
    });

    // Tick thread: 50ms periodic tick for spinner frames and copy feedback expiry
    let tx_tick = tx.clone();
    thread::spawn(move || {
        loop {
            thread::sleep(Duration::from_millis(50));
            if tx_tick.send(Msg::Tick).is_err() {
                break;
            }
        }
    });

    drop(tx);

    // Main event loop
    loop {
        terminal.draw(|f| app.view(f))?;

        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            app.update(msg)?;
        }

        if app.should_quit {
            tracing::info!("yoapi-plugins exiting");
            break;
        }
    }

    Ok(())
}
