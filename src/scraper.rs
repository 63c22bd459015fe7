use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db;
use crate::model::{Castaway, CastawayCollection};
use crate::parser::episode_from_html;
use crate::parser::extract::ExtractConfig;
use crate::parser::listing::{parse_listing, ListingEntry};

/// Episode guide, every episode whether available or not.
const LISTING_URL: &str = "https://www.bbc.co.uk/programmes/b006qnmr/episodes/guide?page=";
const USER_AGENT: &str = concat!("castaway_scraper/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

pub const DEFAULT_SLEEP_SECS: u64 = 3;

/// HTTP access with pacing between network requests and an optional
/// cache for episode pages.
pub struct Fetcher {
    client: reqwest::Client,
    cache: Option<Connection>,
    pause: Duration,
    last_request: Option<Instant>,
    /// Listing URL up to the page number.
    listing_base: String,
}

impl Fetcher {
    pub fn new(cache: Option<Connection>, pause: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Fetcher {
            client,
            cache,
            pause,
            last_request: None,
            listing_base: LISTING_URL.to_string(),
        })
    }

    /// Fetch listing pages from `base` followed by the page number.
    #[cfg(test)]
    pub fn with_listing_base(mut self, base: impl Into<String>) -> Self {
        self.listing_base = base.into();
        self
    }

    pub fn listing_url(&self, page: u32) -> String {
        format!("{}{}", self.listing_base, page)
    }

    /// Listing pages change as episodes are added, so they are never cached.
    pub async fn listing_page(&mut self, page: u32) -> Result<Option<String>> {
        let url = self.listing_url(page);
        self.fetch(&url, false).await
    }

    pub async fn episode_page(&mut self, url: &str) -> Result<Option<String>> {
        self.fetch(url, true).await
    }

    /// Body of `url`, or `None` when the server answers with a non-success
    /// status.
    pub async fn fetch(&mut self, url: &str, use_cache: bool) -> Result<Option<String>> {
        if use_cache {
            if let Some(conn) = &self.cache {
                if let Some(html) = db::cached_page(conn, url)? {
                    debug!(%url, "Cache hit");
                    return Ok(Some(html));
                }
            }
        }

        let (status, body) = self.get_with_retry(url).await?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Page not fetched");
            return Ok(None);
        }

        if use_cache {
            if let Some(conn) = &self.cache {
                db::save_page(conn, url, &body, status.as_u16())?;
            }
        }
        Ok(Some(body))
    }

    async fn get_with_retry(&mut self, url: &str) -> Result<(StatusCode, String)> {
        let mut attempt = 0;
        loop {
            self.pace().await;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("Failed to fetch {}", url))?;
            let status = response.status();

            let should_retry =
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if !should_retry || attempt == MAX_RETRIES {
                let body = response
                    .text()
                    .await
                    .with_context(|| format!("Failed to read body of {}", url))?;
                return Ok((status, body));
            }

            let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
            warn!(
                "Status {} on {} (attempt {}/{}), backing off {:.1}s",
                status.as_u16(),
                url,
                attempt + 1,
                MAX_RETRIES,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    /// Hold off until `pause` has passed since the previous network request.
    async fn pace(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.pause {
                tokio::time::sleep(self.pause - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Fetch the episode page behind a listing entry and extract it. Any
/// failure is logged and the entry yields no castaway.
pub async fn resolve_entry(
    fetcher: &mut Fetcher,
    entry: ListingEntry,
    config: &ExtractConfig,
) -> Option<Castaway> {
    let html = match fetcher.episode_page(&entry.url).await {
        Ok(Some(html)) => html,
        Ok(None) => return None,
        Err(e) => {
            warn!(url = %entry.url, error = %e, "Episode page unavailable");
            return None;
        }
    };

    match episode_from_html(&html, &entry.name, config) {
        Ok(episode) => Some(Castaway {
            name: entry.name,
            job: entry.job,
            url: entry.url,
            episode,
        }),
        Err(e) => {
            warn!(url = %entry.url, error = %e, "Episode skipped");
            None
        }
    }
}

/// Walk listing pages `start..=end`, resolving every castaway on each.
pub async fn walk_listing(
    fetcher: &mut Fetcher,
    start: u32,
    end: u32,
    config: &ExtractConfig,
) -> Result<CastawayCollection> {
    let mut castaways = CastawayCollection::new();
    if end < start {
        warn!(start, end, "Empty page range");
        return Ok(castaways);
    }

    let pages = u64::from(end - start) + 1;
    let pb = ProgressBar::new(pages);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages {msg}")?
            .progress_chars("=> "),
    );

    for page in start..=end {
        info!("Fetching page {}", page);
        let Some(html) = fetcher.listing_page(page).await? else {
            pb.inc(1);
            continue;
        };

        let entries = parse_listing(&html);
        debug!(page, entries = entries.len(), "Listing parsed");
        for entry in entries {
            pb.set_message(entry.name.clone());
            if let Some(castaway) = resolve_entry(fetcher, entry, config).await {
                castaways.push(castaway);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Collected {} castaways from {} pages", castaways.len(), pages);
    Ok(castaways)
}

// ── Tests ──
