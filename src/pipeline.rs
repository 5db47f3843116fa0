use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::info;

use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::parser::{self, selectors::Selectors};
use crate::profile::Profile;

/// Scrape stats returned after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Fetch and extract one profile.
pub async fn scrape_one<F: Fetcher>(
    fetcher: &F,
    selectors: &Selectors,
    url: &str,
) -> Result<Profile, ScrapeError> {
    let markup = fetcher.fetch(url).await?;
    Ok(parser::extract_profile(markup.as_bytes(), url, selectors)?)
}

/// Scrape profiles concurrently, handing each outcome to `on_result` as it arrives.
/// A failed profile is counted and passed on; it never stops the others.
pub async fn scrape_profiles_streaming<F, S>(
    fetcher: Arc<F>,
    selectors: Arc<Selectors>,
    urls: Vec<String>,
    concurrency: usize,
    mut on_result: S,
) -> Result<ScrapeStats>
where
    F: Fetcher + 'static,
    S: FnMut(&str, Result<Profile, ScrapeError>) -> Result<()>,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = urls.len();

    let pb = if total > 1 {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    // Channel: workers send results, main loop hands them to the sink
    let (tx, mut rx) =
        tokio::sync::mpsc::channel::<(String, Result<Profile, ScrapeError>)>(concurrency.max(1) * 2);

    for url in urls {
        let fetcher = Arc::clone(&fetcher);
        let selectors = Arc::clone(&selectors);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return;
            };
            let result = scrape_one(fetcher.as_ref(), &selectors, &url).await;
            let _ = tx.send((url, result)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut ok = 0usize;
    let mut errors = 0usize;

    while let Some((url, result)) = rx.recv().await {
        if result.is_ok() {
            ok += 1;
        } else {
            errors += 1;
        }
        pb.suspend(|| on_result(&url, result))?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Scraped {} profiles ({} ok, {} errors)", total, ok, errors);

    Ok(ScrapeStats { total, ok, errors })
}

// ── Tests ──
