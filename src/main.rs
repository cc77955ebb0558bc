use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod app;
mod config;
mod db;
mod error;
mod listing;
mod models;
mod services;
mod tui;
mod workflow;

use app::App;
use config::Config;
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Check for --seed flag
    let seed_path = if args.len() >= 3 && args[1] == "--seed" {
        Some(PathBuf::from(&args[2]))
    } else {
        None
    };

    // Check for --list flag (headless listing)
    let headless_list = args.len() >= 2 && args[1] == "--list";

    // Initialize app
    let mut app = App::new(&config)
        .await
        .context("failed to open local storage")?;

    // If seed path provided, insert sample posts and exit
    if let Some(path) = seed_path {
        let created = app
            .seed_posts(&path)
            .await
            .with_context(|| format!("failed to seed posts from {}", path.display()))?;
        println!("Seeded {} posts from {:?}", created, path);
        return Ok(());
    }

    // If headless list, print the latest posts and exit
    if headless_list {
        app.load_posts().await.context("failed to fetch posts")?;
        for post in app.filtered_posts() {
            let title = textwrap::wrap(&post.title, 60)
                .into_iter()
                .next()
                .unwrap_or_default();
            println!(
                "{:>8}  {:<6}  {:>5} votes  {}",
                post.id,
                post.category.label(),
                post.total_votes(),
                title
            );
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Flush the draft once typing has paused
        app.tick_autosave(Instant::now());

        // Poll for events with timeout so the autosave tick keeps running
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.input_mode()) {
                        let should_quit = app.handle_action(action).await;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
