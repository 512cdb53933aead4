//! Lazy, serialized page image loading
//!
//! `PageImageLoader` owns a background task that pulls page indices off a FIFO
//! queue and fetches them one at a time, so a book with hundreds of pages never
//! has more than one image request in flight. Results come back on the event
//! channel handed to `spawn`.

mod fetch;
mod queue;
mod retry;

pub use fetch::{image_url, HttpImageFetcher, ImageFetcher};
pub use queue::{warm_up_order, LoadQueue, PageLoadState};
pub use retry::{cache_bust, fetch_with_retry, Exhausted, RetryPolicy};

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::book::PageList;
use crate::config::LoaderConfig;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadCommand {
    Ensure(usize),
    WarmUp(usize),
}

/// Outcome of one page's fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded { index: usize, bytes: Bytes },
    /// Every attempt failed; the page stays blank
    Abandoned { index: usize, attempts: u32 },
}

impl LoadEvent {
    pub fn index(&self) -> usize {
        match self {
            LoadEvent::Loaded { index, .. } | LoadEvent::Abandoned { index, .. } => *index,
        }
    }
}

/// Handle to the loader task. Dropping it stops the task.
pub struct PageImageLoader {
    commands: mpsc::UnboundedSender<LoadCommand>,
    task: JoinHandle<()>,
}

impl PageImageLoader {
    /// Start the loader for the page image `urls`, in page order
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        urls: Vec<Url>,
        fetcher: Arc<dyn ImageFetcher>,
        policy: RetryPolicy,
        events: mpsc::UnboundedSender<LoadEvent>,
    ) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(urls, fetcher, policy, rx, events));
        Self { commands, task }
    }

    /// Start the loader for `pages` using the configured endpoint
    pub fn for_pages(
        pages: &PageList,
        config: &LoaderConfig,
        fetcher: Arc<dyn ImageFetcher>,
        events: mpsc::UnboundedSender<LoadEvent>,
    ) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        let urls = pages
            .iter()
            .map(|page| image_url(&base, &page.image, config.image_size))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::spawn(urls, fetcher, RetryPolicy::from_config(config), events))
    }

    /// Queue the image of page `index` unless it is loaded or already queued
    pub fn ensure_loaded(&self, index: usize) {
        self.send(LoadCommand::Ensure(index));
    }

    /// Queue every page, starting with the neighbourhood of `start`
    pub fn warm_up(&self, start: usize) {
        self.send(LoadCommand::WarmUp(start));
    }

    fn send(&self, command: LoadCommand) {
        if self.commands.send(command).is_err() {
            warn!("Image loader stopped, dropping {:?}", command);
        }
    }
}

impl Drop for PageImageLoader {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn apply(queue: &mut LoadQueue, command: LoadCommand) {
    match command {
        LoadCommand::Ensure(index) => {
            if queue.ensure(index) {
                debug!(index, "Queued page image");
            }
        }
        LoadCommand::WarmUp(start) => {
            let added = queue.warm_up(start);
            debug!(start, added, "Queued warm-up");
        }
    }
}

async fn run(
    urls: Vec<Url>,
    fetcher: Arc<dyn ImageFetcher>,
    policy: RetryPolicy,
    mut commands: mpsc::UnboundedReceiver<LoadCommand>,
    events: mpsc::UnboundedSender<LoadEvent>,
) {
    let mut queue = LoadQueue::new(urls.len());

    loop {
        if queue.is_idle() {
            match commands.recv().await {
                Some(command) => apply(&mut queue, command),
                None => break,
            }
        }
        // Commands that arrived during the last fetch go in before the next pick
        while let Ok(command) = commands.try_recv() {
            apply(&mut queue, command);
        }

        let Some(index) = queue.start_next() else {
            continue;
        };

        debug!(index, url = %urls[index], "Fetching page image");
        let event = match fetch_with_retry(fetcher.as_ref(), &urls[index], &policy).await {
            Ok(bytes) => {
                queue.finish(index, true);
                LoadEvent::Loaded { index, bytes }
            }
            Err(exhausted) => {
                queue.finish(index, false);
                warn!(
                    index,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "Giving up on page image"
                );
                LoadEvent::Abandoned {
                    index,
                    attempts: exhausted.attempts,
                }
            }
        };

        if events.send(event).is_err() {
            info!("Image loader receiver dropped, stopping");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::{Error, Result};

    /// Serves every URL after a short delay, failing the ones listed in `broken`
    #[derive(Default)]
    struct RecordingFetcher {
        broken: HashSet<String>,
        requested: Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ImageFetcher for RecordingFetcher {
        async fn fetch(&self, url: &Url) -> Result<Bytes> {
            let page = url.path_segments().and_then(|s| s.last()).unwrap_or("").to_string();
            self.requested.lock().unwrap().push(page.clone());

            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.broken.contains(&page) {
                Err(Error::ImageFetch("HTTP 404".to_string()))
            } else {
                Ok(Bytes::from(page))
            }
        }
    }

    fn urls(n: usize) -> Vec<Url> {
        let base = Url::parse("https://zco.mx").unwrap();
        (0..n)
            .map(|i| image_url(&base, &format!("p{}", i), crate::book::ImageSize::Web).unwrap())
            .collect()
    }

    async fn collect(rx: &mut mpsc::UnboundedReceiver<LoadEvent>, n: usize) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while events.len() < n {
            events.push(rx.recv().await.unwrap());
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_up_fetches_in_priority_order_one_at_a_time() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = PageImageLoader::spawn(urls(6), fetcher.clone(), RetryPolicy::default(), tx);

        loader.warm_up(2);
        let events = collect(&mut rx, 6).await;

        let order: Vec<usize> = events.iter().map(LoadEvent::index).collect();
        assert_eq!(order, vec![2, 3, 1, 0, 5, 4]);
        assert_eq!(fetcher.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_twice_fetches_once() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = PageImageLoader::spawn(urls(4), fetcher.clone(), RetryPolicy::default(), tx);

        loader.ensure_loaded(1);
        loader.ensure_loaded(1);
        loader.ensure_loaded(3);
        collect(&mut rx, 2).await;

        // Already loaded
        loader.ensure_loaded(1);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["p1", "p3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_during_fetch_join_the_queue() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = PageImageLoader::spawn(urls(4), fetcher.clone(), RetryPolicy::default(), tx);

        loader.ensure_loaded(0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        loader.ensure_loaded(0);
        loader.ensure_loaded(2);

        let events = collect(&mut rx, 2).await;
        assert_eq!(events.iter().map(LoadEvent::index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(fetcher.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broken_page_is_abandoned_and_queue_continues() {
        let fetcher = Arc::new(RecordingFetcher {
            broken: HashSet::from(["p0".to_string()]),
            ..Default::default()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = PageImageLoader::spawn(urls(2), fetcher.clone(), RetryPolicy::default(), tx);

        loader.ensure_loaded(0);
        loader.ensure_loaded(1);
        let events = collect(&mut rx, 2).await;

        assert_eq!(events[0], LoadEvent::Abandoned { index: 0, attempts: 5 });
        assert_eq!(events[1], LoadEvent::Loaded { index: 1, bytes: Bytes::from("p1") });

        // Abandoned pages are not retried later
        loader.ensure_loaded(0);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(fetcher.requested.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_for_pages_builds_download_urls() {
        let pages = PageList::from_json(r#"[{"id": 1, "image": "cover.jpg"}]"#).unwrap();
        let fetcher = Arc::new(RecordingFetcher::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader =
            PageImageLoader::for_pages(&pages, &LoaderConfig::default(), fetcher.clone(), tx).unwrap();

        loader.ensure_loaded(0);
        let events = collect(&mut rx, 1).await;
        assert_eq!(events[0].index(), 0);
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["cover.jpg"]);
    }
}
