//! Incremental page loader with a disk cache.

pub mod cache;

pub use cache::DiskCache;

use std::sync::{Mutex, MutexGuard};

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::client::{ApiClient, DEFAULT_PAGE_SIZE};
use crate::error::{ApiError, Result};
use crate::types::Page;

/// What a [`Paginator::load_more`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was appended.
    Loaded { count: usize, from_cache: bool },
    /// Already loading, exhausted, or superseded by a reset.
    Skipped,
}

#[derive(Debug)]
struct PageState<T> {
    items: Vec<T>,
    current_page: u32,
    can_load_more: bool,
    loading: bool,
    error_message: Option<String>,
    query: Option<String>,
    generation: u64,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            can_load_more: true,
            loading: false,
            error_message: None,
            query: None,
            generation: 0,
        }
    }
}

/// Page-cursor loader over a list endpoint (`{endpoint}?page=&limit=`) and
/// its search twin (`{endpoint}/search?q=&page=&limit=`).
///
/// A page shorter than the page size marks the list exhausted. Page bodies
/// are cached on disk by exact URL and served from there on the next
/// request for the same URL until [`refresh`](Self::refresh).
///
/// Methods take `&self`, so a paginator can be shared between the task that
/// renders items and the one that loads them.
///
/// # Example
/// ```no_run
/// use prasaddys::client::ApiClient;
/// use prasaddys::pagination::{DiskCache, Paginator};
/// use prasaddys::types::Album;
///
/// # async fn run() -> prasaddys::error::Result<()> {
/// let client = ApiClient::new("https://media.example.com/api/media")?;
/// let albums: Paginator<Album> = Paginator::new(client, "/albums", DiskCache::new_default())?;
/// albums.load_more().await?;
/// albums.search("rahman").await?;
/// println!("{} albums", albums.items().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Paginator<T> {
    client: ApiClient,
    base_url: String,
    page_size: u32,
    item_key: Option<String>,
    cache: DiskCache,
    state: Mutex<PageState<T>>,
}

impl<T> Paginator<T>
where
    T: DeserializeOwned + Clone,
{
    pub fn new(client: ApiClient, endpoint: &str, cache: DiskCache) -> Result<Self> {
        let base_url = client
            .endpoint_url(endpoint)?
            .as_str()
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
            item_key: None,
            cache,
            state: Mutex::new(PageState::default()),
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Decode items from this JSON key instead of guessing the item array.
    pub fn with_item_key(mut self, key: impl Into<String>) -> Self {
        self.item_key = Some(key.into());
        self
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn can_load_more(&self) -> bool {
        self.lock().can_load_more
    }

    /// The next page to request (1-based).
    pub fn current_page(&self) -> u32 {
        self.lock().current_page
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error_message.clone()
    }

    pub fn query(&self) -> Option<String> {
        self.lock().query.clone()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch the next page of the current listing or search.
    ///
    /// Errors are also recorded in [`error_message`](Self::error_message);
    /// items loaded so far are kept.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let (url, generation) = {
            let mut state = self.lock();
            if state.loading || !state.can_load_more {
                return Ok(LoadOutcome::Skipped);
            }
            let url = self.page_url(state.query.as_deref(), state.current_page)?;
            state.loading = true;
            state.error_message = None;
            (url, state.generation)
        };
        let _loading = LoadingGuard {
            state: &self.state,
            generation,
        };

        let (bytes, from_cache) = match self.cache.read(url.as_str()) {
            Ok(Some(bytes)) => (bytes, true),
            Ok(None) => (self.fetch(&url, generation).await?, false),
            Err(err) => {
                tracing::warn!(error = %err, "page cache read failed; fetching");
                (self.fetch(&url, generation).await?, false)
            }
        };

        let page = match self.decode(&bytes) {
            Ok(page) => page,
            Err(err) => {
                self.record_error(generation, format!("Decoding error: {err}"));
                return Err(ApiError::Decoding(err));
            }
        };
        if !from_cache {
            if let Err(err) = self.cache.write(url.as_str(), &bytes) {
                tracing::warn!(error = %err, "failed to cache page");
            }
        }

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!("discarding page loaded before reset");
            return Ok(LoadOutcome::Skipped);
        }
        let count = page.items.len();
        state.items.extend(page.items);
        state.can_load_more = count == self.page_size as usize;
        state.current_page += 1;
        tracing::debug!(
            page = state.current_page - 1,
            count,
            from_cache,
            exhausted = !state.can_load_more,
            "page loaded"
        );
        Ok(LoadOutcome::Loaded { count, from_cache })
    }

    /// Start a search from page 1. Later [`load_more`](Self::load_more)
    /// calls continue the search.
    pub async fn search(&self, query: &str) -> Result<LoadOutcome> {
        {
            let mut state = self.lock();
            Self::reset_state(&mut state);
            state.query = Some(query.to_string());
        }
        self.load_more().await
    }

    /// Load pages until the listing is exhausted or a load fails. Returns
    /// the total number of items held.
    pub async fn load_all_pages(&self) -> Result<usize> {
        while let LoadOutcome::Loaded { .. } = self.load_more().await? {}
        Ok(self.len())
    }

    /// Forget loaded items and the active search; the next load starts at page 1.
    pub fn reset(&self) {
        Self::reset_state(&mut self.lock());
    }

    /// Wipe the disk cache, then [`reset`](Self::reset).
    pub fn refresh(&self) -> Result<()> {
        self.cache.clear()?;
        self.reset();
        Ok(())
    }

    fn reset_state(state: &mut PageState<T>) {
        let generation = state.generation + 1;
        *state = PageState {
            generation,
            ..PageState::default()
        };
    }

    fn page_url(&self, query: Option<&str>, page: u32) -> Result<Url> {
        let page = page.to_string();
        let limit = self.page_size.to_string();
        let parsed = match query {
            Some(q) => Url::parse_with_params(
                &format!("{}/search", self.base_url),
                &[("q", q), ("page", page.as_str()), ("limit", limit.as_str())],
            ),
            None => Url::parse_with_params(
                &self.base_url,
                &[("page", page.as_str()), ("limit", limit.as_str())],
            ),
        };
        parsed.map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.base_url)))
    }

    async fn fetch(&self, url: &Url, generation: u64) -> Result<Vec<u8>> {
        self.client.get_bytes(url).await.map_err(|err| {
            self.record_error(generation, err.to_string());
            err
        })
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Page<T>, serde_json::Error> {
        match &self.item_key {
            Some(key) => Page::from_slice_with_key(bytes, key),
            None => Page::from_slice(bytes),
        }
    }

    fn record_error(&self, generation: u64, message: String) {
        let mut state = self.lock();
        if state.generation == generation {
            state.error_message = Some(message);
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState<T>> {
        lock_state(&self.state)
    }
}

fn lock_state<T>(state: &Mutex<PageState<T>>) -> MutexGuard<'_, PageState<T>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears `loading` when a load finishes or its future is dropped, unless a
/// reset already started a newer generation.
struct LoadingGuard<'a, T> {
    state: &'a Mutex<PageState<T>>,
    generation: u64,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = lock_state(self.state);
        if state.generation == self.generation {
            state.loading = false;
        }
    }
}
