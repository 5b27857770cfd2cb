use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::execute;
use futures::StreamExt;
use ratatui::prelude::*;
use tracing::{info, warn};

use multiselect::app::{self, App, Status};
use multiselect::config::{self, Settings};
use multiselect::input::{handle_key, handle_mouse};
use multiselect::{MultiSelect, logging, ui};

#[derive(Parser, Debug)]
#[command(name = "multiselect", version, about = "Pick several items from a dropdown list")]
struct Args {
    /// Config file layered over the default and user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candidate list (.json or .toml), overrides `items_path`
    #[arg(short, long)]
    items: Option<String>,

    /// Label shown above the toggle
    #[arg(short, long)]
    label: Option<String>,

    /// Hide the Select All / Clear All / Done row
    #[arg(long)]
    no_button: bool,

    /// Don't open the menu when the toggle is clicked
    #[arg(long)]
    read_only: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    if let Some(items) = args.items {
        settings.items_path = Some(items);
    }
    if let Some(label) = args.label {
        settings.widget.label = label;
    }
    settings.widget.has_button &= !args.no_button;
    settings.widget.is_editable &= !args.read_only;

    let log_file = settings
        .log_file
        .as_deref()
        .map(config::expand_path)
        .transpose()?;
    logging::init(log_file.as_deref())?;

    let items = settings.candidate_items().context("loading candidate items")?;
    info!(count = items.len(), label = %settings.widget.label, "starting");

    let status = Status::default();
    let widget = MultiSelect::builder(settings.widget.clone(), items)
        .send_items(|items| tracing::debug!(count = items.len(), "selection sent"))
        .mount(app::report_selection(&status));
    let mut app = App::new(widget, status, args.config);

    terminal::enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, Duration::from_millis(settings.tick_rate_ms)).await;

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        warn!(error = %e, "event loop failed");
    }
    result
}

async fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick_rate: Duration) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| ui::render_app(f, app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if handle_key(app, key) {
                        break;
                    }
                }
                Some(Ok(Event::Mouse(mouse))) => handle_mouse(app, mouse).await,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    info!("quit");
    Ok(())
}
