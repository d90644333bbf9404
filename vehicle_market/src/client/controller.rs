//! Drives a [`BrowseState`] against a [`ListingFetcher`].
//!
//! Every fetch takes the next request generation. A response is applied only
//! if no newer fetch started while it was in flight, so a slow early
//! response can never overwrite a faster later one. Free-text filters wait
//! for a quiet period before fetching; every other change fetches at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::fetcher::ListingFetcher;
use super::persistence::PreferenceStore;
use super::state::{BrowseState, FREE_TEXT_FILTERS, SortChoice, ViewMode};
use crate::models::VehicleKind;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

struct Shared {
    state: Mutex<BrowseState>,
    fetcher: Arc<dyn ListingFetcher>,
    preferences: Arc<dyn PreferenceStore>,
    generation: AtomicU64,
    /// Bumped on every query change; a pending debounced fetch only runs if
    /// it still holds the latest value.
    edits: AtomicU64,
    debounce: Duration,
}

impl Shared {
    async fn load(&self) {
        let (generation, kind, params) = {
            let mut state = self.state.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.begin_loading();
            (generation, state.kind, state.query_params())
        };

        let result = self.fetcher.fetch(kind, &params).await;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, %kind, "discarding stale listing response");
            return;
        }
        match result {
            Ok(response) => state.succeed(response),
            Err(err) => {
                tracing::warn!(error = %err, %kind, "listing fetch failed");
                state.fail();
            }
        }
    }

    fn persist(&self, state: &BrowseState) {
        if let Err(err) = self.preferences.save(&state.preferences()) {
            tracing::warn!(error = %err, "could not save browse preferences");
        }
    }
}

/// Cheap to clone; clones share one state.
#[derive(Clone)]
pub struct BrowseController {
    shared: Arc<Shared>,
}

impl BrowseController {
    /// Build a controller, restoring saved preferences. Unreadable
    /// preferences are logged and replaced by the defaults.
    #[must_use]
    pub fn new(
        kind: VehicleKind,
        fetcher: Arc<dyn ListingFetcher>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self::with_debounce(kind, fetcher, preferences, DEFAULT_DEBOUNCE)
    }

    #[must_use]
    pub fn with_debounce(
        kind: VehicleKind,
        fetcher: Arc<dyn ListingFetcher>,
        preferences: Arc<dyn PreferenceStore>,
        debounce: Duration,
    ) -> Self {
        let saved = preferences.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable browse preferences");
            None
        });
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BrowseState::new(kind, saved.unwrap_or_default())),
                fetcher,
                preferences,
                generation: AtomicU64::new(0),
                edits: AtomicU64::new(0),
                debounce,
            }),
        }
    }

    pub async fn snapshot(&self) -> BrowseState {
        self.shared.state.lock().await.clone()
    }

    /// Fetch the current query now.
    pub async fn refresh(&self) {
        self.shared.edits.fetch_add(1, Ordering::SeqCst);
        self.shared.load().await;
    }

    /// Set or clear a filter. Free-text keys fetch after the debounce period,
    /// the rest immediately.
    pub async fn set_filter(&self, key: &str, value: &str) {
        let changed = self.shared.state.lock().await.set_filter(key, value);
        if !changed {
            return;
        }
        if FREE_TEXT_FILTERS.contains(&key) {
            self.schedule();
        } else {
            self.refresh().await;
        }
    }

    pub async fn clear_filters(&self) {
        if self.shared.state.lock().await.clear_filters() {
            self.refresh().await;
        }
    }

    pub async fn set_sort(&self, sort: SortChoice) {
        let changed = {
            let mut state = self.shared.state.lock().await;
            let changed = state.set_sort(sort);
            self.shared.persist(&state);
            changed
        };
        if changed {
            self.refresh().await;
        }
    }

    pub async fn set_per_page(&self, per_page: u64) {
        let changed = {
            let mut state = self.shared.state.lock().await;
            let changed = state.set_per_page(per_page);
            self.shared.persist(&state);
            changed
        };
        if changed {
            self.refresh().await;
        }
    }

    pub async fn set_page(&self, page: u64) {
        if self.shared.state.lock().await.set_page(page) {
            self.refresh().await;
        }
    }

    /// Persisted, never fetched.
    pub async fn set_view(&self, view: ViewMode) {
        let mut state = self.shared.state.lock().await;
        state.set_view(view);
        self.shared.persist(&state);
    }

    fn schedule(&self) {
        let edit = self.shared.edits.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.debounce).await;
            if shared.edits.load(Ordering::SeqCst) == edit {
                shared.load().await;
            }
        });
    }
}
