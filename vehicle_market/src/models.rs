use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

use crate::filtering::schema::{CARAVANS, CARS, EBIKES, EntitySchema, MOTORCYCLES, TRUCKS};

/// The five listing types the marketplace serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Truck,
    Car,
    Motorcycle,
    #[serde(rename = "ebike")]
    EBike,
    Caravan,
}

impl VehicleKind {
    pub const ALL: [Self; 5] = [
        Self::Truck,
        Self::Car,
        Self::Motorcycle,
        Self::EBike,
        Self::Caravan,
    ];

    #[must_use]
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Self::Truck => &TRUCKS,
            Self::Car => &CARS,
            Self::Motorcycle => &MOTORCYCLES,
            Self::EBike => &EBIKES,
            Self::Caravan => &CARAVANS,
        }
    }

    /// URL segment and table name, e.g. `ebikes`.
    #[must_use]
    pub fn plural(self) -> &'static str {
        self.schema().plural
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().singular)
    }
}

/// Query parameters with a fixed meaning on every list endpoint; everything
/// else in the query string is treated as a filter.
pub const RESERVED_PARAMS: &[&str] = &["page", "limit", "sortBy", "sortOrder", "sort", "q"];

/// Documentation shape of the list query string.
///
/// Handlers receive the raw map and split it with [`ListingQuery::from_params`];
/// this struct only feeds the OpenAPI document.
#[derive(Deserialize, IntoParams, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingQueryParams {
    /// 1-based page number (default 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Page size (default 12, capped at 100)
    #[param(example = 12)]
    pub limit: Option<u64>,
    /// One of `created_at`, `price`, `year`, `mileage`
    #[param(example = "price")]
    pub sort_by: Option<String>,
    /// `ASC` or `DESC`
    #[param(example = "ASC")]
    pub sort_order: Option<String>,
    /// Combined sort such as `price_asc` or `newest`
    pub sort: Option<String>,
    /// Free-text search across brand, model, description and city
    pub q: Option<String>,
    /// Exact brand match, comma-separated for several
    #[param(example = "BMW")]
    pub brand: Option<String>,
    /// Substring match on the model name
    pub model: Option<String>,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Listings without a recorded mileage also match
    pub max_mileage: Option<i64>,
    pub condition: Option<String>,
}

/// A list request split into its control values and filter map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListingQuery {
    #[must_use]
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        let page = params.remove("page");
        let limit = params.remove("limit");
        let sort_by = params.remove("sortBy");
        let sort_order = params.remove("sortOrder");
        let sort = params.remove("sort");
        let search = params.remove("q");
        Self {
            page,
            limit,
            sort_by,
            sort_order,
            sort,
            search,
            filters: params.into_iter().collect(),
        }
    }
}

/// Uniform list envelope returned by every listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Rows matching the filter, independent of pagination.
    pub total: u64,
}

impl<T> ListResponse<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
