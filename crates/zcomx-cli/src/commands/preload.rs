use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use zcomx_core::book::PageSource;
use zcomx_core::loader::HttpImageFetcher;
use zcomx_core::{AppConfig, LoadEvent, PageImageLoader};

/// Fetch every page image of a book through the loader queue
pub async fn run(config: &AppConfig, source: &str, start: usize) -> Result<()> {
    let fetcher = Arc::new(HttpImageFetcher::new(&config.loader)?);
    let source = PageSource::parse(source)?;
    let pages = source.load(fetcher.client()).await?;
    let start = start.min(pages.last_index());

    println!(
        "Preloading {} pages of {} ({} size), starting at page {}",
        pages.len(),
        source,
        config.loader.image_size.as_str(),
        start + 1
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let loader = PageImageLoader::for_pages(&pages, &config.loader, fetcher, tx)?;
    loader.warm_up(start);

    let mut loaded = 0usize;
    let mut total_bytes = 0usize;
    let mut abandoned = Vec::new();
    for _ in 0..pages.len() {
        match rx.recv().await {
            Some(LoadEvent::Loaded { index, bytes }) => {
                loaded += 1;
                total_bytes += bytes.len();
                println!("  page {:>4}  {:>9} bytes", index + 1, bytes.len());
            }
            Some(LoadEvent::Abandoned { index, attempts }) => {
                println!("  page {:>4}  abandoned after {} attempts", index + 1, attempts);
                abandoned.push(index + 1);
            }
            None => break,
        }
    }

    println!("{} of {} pages loaded ({} bytes)", loaded, pages.len(), total_bytes);
    if !abandoned.is_empty() {
        let list: Vec<String> = abandoned.iter().map(ToString::to_string).collect();
        println!("Unavailable: {}", list.join(", "));
    }
    Ok(())
}
