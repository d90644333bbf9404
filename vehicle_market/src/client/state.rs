use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::filtering::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::models::{ListResponse, VehicleKind};

/// Filters typed character by character; changes to these are debounced.
pub const FREE_TEXT_FILTERS: &[&str] = &["model", "q", "city"];

/// Shown instead of the underlying fetch error.
pub const GENERIC_ERROR: &str = "Could not load listings. Please try again.";

/// The sort dropdown. Each choice maps onto the combined `sort` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortChoice {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    YearDesc,
    YearAsc,
    MileageAsc,
}

impl SortChoice {
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::YearDesc => "year_desc",
            Self::YearAsc => "year_asc",
            Self::MileageAsc => "mileage_asc",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Fetch lifecycle: `Idle -> Loading -> Success | Error`, back to `Idle`
/// when the query changes again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// The persisted subset of [`BrowseState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub sort: SortChoice,
    pub view: ViewMode,
    pub per_page: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sort: SortChoice::default(),
            view: ViewMode::default(),
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

fn clamp_per_page(per_page: u64) -> u64 {
    per_page.clamp(1, MAX_PAGE_SIZE)
}

/// Browse page state for one vehicle kind.
///
/// Query mutators return whether the derived query changed, which is what
/// decides a refetch. They never fetch themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    pub kind: VehicleKind,
    pub filters: BTreeMap<String, String>,
    pub sort: SortChoice,
    pub view: ViewMode,
    pub page: u64,
    pub per_page: u64,
    pub phase: Phase,
    pub items: Vec<Value>,
    pub total: u64,
    pub error: Option<String>,
}

impl BrowseState {
    #[must_use]
    pub fn new(kind: VehicleKind, preferences: Preferences) -> Self {
        Self {
            kind,
            filters: BTreeMap::new(),
            sort: preferences.sort,
            view: preferences.view,
            page: 1,
            per_page: clamp_per_page(preferences.per_page),
            phase: Phase::Idle,
            items: Vec::new(),
            total: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences {
            sort: self.sort,
            view: self.view,
            per_page: self.per_page,
        }
    }

    /// Query string pairs for the list endpoint, in a stable order.
    #[must_use]
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        params.push(("sort".to_string(), self.sort.as_param().to_string()));
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("limit".to_string(), self.per_page.to_string()));
        params
    }

    /// Set or clear one filter. Empty values and `Any` clear it. Any change
    /// goes back to page 1.
    pub fn set_filter(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        let changed = if value.is_empty() || value.eq_ignore_ascii_case("any") {
            self.filters.remove(key).is_some()
        } else if self.filters.get(key).map(String::as_str) == Some(value) {
            false
        } else {
            self.filters.insert(key.to_string(), value.to_string());
            true
        };
        if changed {
            self.page = 1;
            self.phase = Phase::Idle;
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters.clear();
        self.page = 1;
        self.phase = Phase::Idle;
        true
    }

    pub fn set_sort(&mut self, sort: SortChoice) -> bool {
        if self.sort == sort {
            return false;
        }
        self.sort = sort;
        self.phase = Phase::Idle;
        true
    }

    /// Changing the page size also goes back to page 1.
    pub fn set_per_page(&mut self, per_page: u64) -> bool {
        let per_page = clamp_per_page(per_page);
        if self.per_page == per_page {
            return false;
        }
        self.per_page = per_page;
        self.page = 1;
        self.phase = Phase::Idle;
        true
    }

    pub fn set_page(&mut self, page: u64) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        self.phase = Phase::Idle;
        true
    }

    /// The view is presentation only; it never changes the query.
    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    /// Number of pages for the current total, at least one.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub(crate) fn begin_loading(&mut self) {
        self.phase = Phase::Loading;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, response: ListResponse<Value>) {
        self.phase = Phase::Success;
        self.items = response.items;
        self.total = response.total;
        self.error = None;
    }

    pub(crate) fn fail(&mut self) {
        self.phase = Phase::Error;
        self.items.clear();
        self.total = 0;
        self.error = Some(GENERIC_ERROR.to_string());
    }
}
