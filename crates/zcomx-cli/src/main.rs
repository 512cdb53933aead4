use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zcomx_core::book::ImageSize;
use zcomx_core::{AppConfig, ReaderMode};

mod commands;

#[derive(Parser)]
#[command(name = "zcomx")]
#[command(author, version, about = "A terminal comic book reader for zco.mx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Request print-size images instead of web-size
    #[arg(long, global = true)]
    print: bool,

    /// Site serving the page images (overrides loader.base_url)
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a book in the terminal
    Read {
        /// Page list: JSON file or http(s) URL
        source: String,
        /// Presentation (defaults to reader.mode)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
        /// Page to open at (1-based)
        #[arg(short, long)]
        start: Option<usize>,
        /// Wrap around past the first and last page
        #[arg(long)]
        rotate: bool,
        /// Accept frame messages on stdin and print the close message on exit
        #[arg(long)]
        embedded: bool,
    },
    /// Fetch every page image once, nearest to the start page first
    Preload {
        source: String,
        /// Page to start from (1-based)
        #[arg(short, long, default_value_t = 1)]
        start: usize,
    },
    /// List the pages of a book
    Pages {
        source: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Submit a remote action, e.g. `login/book_crud`
    Action {
        name: String,
        /// JSON payload
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Slider,
    Scroller,
}

impl From<ModeArg> for ReaderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Slider => ReaderMode::Slider,
            ModeArg::Scroller => ReaderMode::Scroller,
        }
    }
}

/// Log to stderr, or to `{data_dir}/zcomx.log` while the TUI owns the terminal
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.clone()));

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if cli.print {
        config.loader.image_size = ImageSize::Print;
    }
    if let Some(base_url) = cli.base_url {
        config.loader.base_url = base_url;
    }

    init_logging(&config, matches!(cli.command, Commands::Read { .. }))?;

    match cli.command {
        Commands::Read {
            source,
            mode,
            start,
            rotate,
            embedded,
        } => {
            if let Some(mode) = mode {
                config.reader.mode = mode.into();
            }
            if let Some(start) = start {
                config.reader.start_page = start.saturating_sub(1);
            }
            config.reader.rotate |= rotate;
            commands::read::run(Arc::new(config), &source, embedded).await
        }
        Commands::Preload { source, start } => {
            commands::preload::run(&config, &source, start.saturating_sub(1)).await
        }
        Commands::Pages { source, json } => commands::pages::run(&config, &source, json).await,
        Commands::Action { name, data } => {
            commands::action::run(&config, &name, data.as_deref()).await
        }
    }
}
