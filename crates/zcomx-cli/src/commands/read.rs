use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use zcomx_core::book::PageSource;
use zcomx_core::loader::HttpImageFetcher;
use zcomx_core::{AppConfig, FrameMessage, PageImageLoader, PageList, Reader, ReaderOutcome};
use zcomx_tui::{
    app::{page_viewport, App},
    event::{AppEvent, EventHandler, ResizeDebouncer},
    input::{handle_key_event, handle_mouse_event},
    keymap::Keymap,
    ui, Theme,
};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(config: Arc<AppConfig>, source: &str, embedded: bool) -> Result<()> {
    let fetcher = Arc::new(HttpImageFetcher::new(&config.loader)?);

    // Fail before touching the terminal if the first book cannot be read
    let mut pages = load_pages(&fetcher, source).await?;

    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
    if embedded {
        spawn_frame_listener(frame_tx);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("zcomx"))?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = loop {
        match read_book(&mut terminal, &config, &fetcher, pages, &mut frame_rx).await {
            Ok(ReaderOutcome::Switch(location)) => match load_pages(&fetcher, &location).await {
                Ok(next) => pages = next,
                Err(e) => break Err(e),
            },
            other => break other,
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    let outcome = result?;
    if embedded {
        if let ReaderOutcome::Close(message) = outcome {
            println!("{}", message.to_json()?);
        }
    }
    Ok(())
}

async fn load_pages(fetcher: &HttpImageFetcher, location: &str) -> Result<PageList> {
    let source = PageSource::parse(location)?;
    let pages = source
        .load(fetcher.client())
        .await
        .with_context(|| format!("Failed to load page list from {}", source))?;
    info!(%source, pages = pages.len(), "Loaded page list");
    Ok(pages)
}

/// Parent-frame messages arrive one per line on stdin
fn spawn_frame_listener(tx: mpsc::UnboundedSender<FrameMessage>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match FrameMessage::parse(&line) {
                    Ok(message) => {
                        if tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring frame message {:?}: {}", line, e),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Frame message input closed: {}", e);
                    break;
                }
            }
        }
    });
}

/// Run the reader on one book until it closes or is switched away
async fn read_book(
    terminal: &mut Tui,
    config: &Arc<AppConfig>,
    fetcher: &Arc<HttpImageFetcher>,
    pages: PageList,
    frame_rx: &mut mpsc::UnboundedReceiver<FrameMessage>,
) -> Result<ReaderOutcome> {
    let size = terminal.size()?;
    let mut reader = Reader::new(pages, page_viewport(size.width, size.height), config);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let loader = PageImageLoader::for_pages(reader.pages(), &config.loader, fetcher.clone(), event_tx)?;
    reader.attach_loader(loader);

    let mut app = App::new(config.clone(), reader, Theme::default());
    let keymap = Keymap::from_config(&config.keymap);
    let events = EventHandler::with_animation_fps(config.reader.tick_rate_ms, config.scroll.animation_fps);
    let mut resize = ResizeDebouncer::new(Duration::from_millis(config.reader.resize_debounce_ms));

    loop {
        // Process finished image loads (non-blocking)
        while let Ok(event) = event_rx.try_recv() {
            app.on_load_event(event);
        }
        while let Ok(message) = frame_rx.try_recv() {
            app.handle_frame_message(message);
        }
        if let Some((cols, rows)) = resize.ready() {
            app.resize(cols, rows);
        }
        let animating = app.reader.tick();

        if app.should_quit {
            break;
        }

        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        let event = if animating || resize.is_pending() {
            events.next_animation()?
        } else {
            events.next()?
        };
        match event {
            Some(AppEvent::Key(key)) => {
                let action = handle_key_event(key, &app, &keymap);
                app.apply(action);
            }
            Some(AppEvent::Mouse(mouse)) => {
                let action = handle_mouse_event(mouse, &app);
                app.apply(action);
            }
            Some(AppEvent::Resize(cols, rows)) => resize.push(cols, rows),
            Some(AppEvent::Tick) | None => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(app.outcome.take().unwrap_or(ReaderOutcome::Close(FrameMessage::Close)))
}
