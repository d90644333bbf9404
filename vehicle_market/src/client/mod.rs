//! # Browse client
//!
//! The consumer side of the list endpoints: the filter, sort, view and page
//! state behind a listing browse page, a persisted preference subset, and a
//! controller that turns state changes into fetches.
//!
//! ```rust,ignore
//! let fetcher = Arc::new(HttpFetcher::new("http://localhost:3000", HttpFetcher::DEFAULT_TIMEOUT)?);
//! let prefs = Arc::new(FilePreferenceStore::new("browse-cars.json"));
//! let browse = BrowseController::new(VehicleKind::Car, fetcher, prefs);
//!
//! browse.set_filter("brand", "BMW").await;   // fetches now, page back to 1
//! browse.set_filter("q", "touring").await;   // fetches after 300ms of quiet
//! browse.set_view(ViewMode::List).await;     // saved, no fetch
//! ```

pub mod controller;
pub mod fetcher;
pub mod persistence;
pub mod state;

pub use controller::{BrowseController, DEFAULT_DEBOUNCE};
pub use fetcher::{FetchError, HttpFetcher, ListingFetcher};
pub use persistence::{FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore};
pub use state::{BrowseState, Phase, Preferences, SortChoice, ViewMode};
