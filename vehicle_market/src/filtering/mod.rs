//! # Listing query pipeline
//!
//! Turns a raw list query string into a [`QueryPlan`]: an allow-listed,
//! parameterized predicate set, a resolved sort with a stable tie-break, and
//! a LIMIT/OFFSET page. The same plan drives both the item query and the
//! count query, so `total` always matches the predicate behind `items`.
//!
//! ## Query parameter examples
//!
//! ```text
//! GET /api/cars?brand=BMW&minPrice=20000&maxPrice=40000&sortBy=price&sortOrder=ASC
//! GET /api/cars?fuelType=Diesel,Electric&condition=Any&page=2&limit=25
//! GET /api/motorcycles?minEngineSize=600&sort=year_desc
//! GET /api/ebikes?q=commuter
//! ```
//!
//! Empty values and `Any` mean "no constraint". Keys an entity does not list
//! are ignored. Non-numeric values for numeric filters are rejected before
//! any query runs.

pub mod conditions;
pub mod pagination;
pub mod schema;
pub mod search;
pub mod sort;

pub use conditions::{CompiledFilter, FilterError, FilterRejection, Predicate, compile_filters};
pub use pagination::{PageDefaults, PageError, PageRequest, calculate_content_range, resolve_page};
pub use schema::{Comparison, EntitySchema, FieldSpec, ValueKind};
pub use sort::{Direction, SortSpec, resolve_sort};

use crate::errors::ApiError;
use crate::models::ListingQuery;

/// Everything needed to run one list request against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub table: &'static str,
    pub filter: CompiledFilter,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl QueryPlan {
    /// Compile a list query for one entity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ValidationFailed`] with one entry per rejected
    /// filter or pagination value.
    pub fn compile(
        schema: &EntitySchema,
        query: &ListingQuery,
        defaults: PageDefaults,
    ) -> Result<Self, ApiError> {
        let filter = compile_filters(schema, &query.filters, query.search.as_deref());
        let page = resolve_page(query.page.as_deref(), query.limit.as_deref(), defaults);

        let (filter, page) = match (filter, page) {
            (Ok(filter), Ok(page)) => (filter, page),
            (filter, page) => {
                let mut errors: Vec<String> = filter
                    .err()
                    .map(|rejection| rejection.0.iter().map(ToString::to_string).collect())
                    .unwrap_or_default();
                errors.extend(page.err().into_iter().flatten().map(|e| e.to_string()));
                return Err(ApiError::validation_failed(errors));
            }
        };

        let sort = resolve_sort(
            schema,
            query.sort_by.as_deref(),
            query.sort_order.as_deref(),
            query.sort.as_deref(),
        );

        Ok(Self {
            table: schema.table,
            filter,
            sort,
            page,
        })
    }

    /// Parameterized SQL for the item query, for logging and inspection.
    #[must_use]
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
            self.table,
            self.filter.where_clause(),
            self.sort.order_by_clause(),
            self.page.limit,
            self.page.offset
        )
    }

    /// Parameterized SQL for the count query; shares the item query's WHERE.
    #[must_use]
    pub fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.table,
            self.filter.where_clause()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use schema::CARS;

    fn query(pairs: &[(&str, &str)]) -> ListingQuery {
        ListingQuery::from_params(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_plan_for_documented_example() {
        let plan = QueryPlan::compile(
            &CARS,
            &query(&[
                ("brand", "BMW"),
                ("minPrice", "20000"),
                ("maxPrice", "40000"),
                ("sortBy", "price"),
                ("sortOrder", "ASC"),
                ("page", "1"),
                ("limit", "10"),
            ]),
            PageDefaults::default(),
        )
        .unwrap();

        assert_eq!(
            plan.select_sql(),
            "SELECT * FROM cars WHERE UPPER(brand) = UPPER(?) AND price >= ? AND price <= ? \
             ORDER BY price ASC, id ASC LIMIT 10 OFFSET 0"
        );
        assert_eq!(
            plan.count_sql(),
            "SELECT COUNT(*) FROM cars WHERE UPPER(brand) = UPPER(?) AND price >= ? AND price <= ?"
        );
    }

    #[test]
    fn test_plan_without_parameters() {
        let plan = QueryPlan::compile(&CARS, &ListingQuery::default(), PageDefaults::default())
            .unwrap();
        assert_eq!(
            plan.select_sql(),
            "SELECT * FROM cars WHERE 1=1 ORDER BY created_at DESC, id ASC LIMIT 12 OFFSET 0"
        );
    }

    #[test]
    fn test_plan_collects_filter_and_page_errors() {
        let result = QueryPlan::compile(
            &CARS,
            &query(&[("minPrice", "abc"), ("page", "0")]),
            PageDefaults::default(),
        );
        match result {
            Err(ApiError::ValidationFailed { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
