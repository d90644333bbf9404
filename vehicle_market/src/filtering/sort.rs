use sea_orm::sea_query::Order;

use super::schema::{DEFAULT_SORT_COLUMN, EntitySchema};

/// Column appended to every ORDER BY so pages never overlap on ties.
pub const TIE_BREAK_COLUMN: &str = "id";

/// A resolved, allow-listed sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: DEFAULT_SORT_COLUMN,
            direction: Direction::Desc,
        }
    }
}

impl SortSpec {
    /// `ORDER BY` body including the tie-break column.
    #[must_use]
    pub fn order_by_clause(&self) -> String {
        format!(
            "{} {}, {TIE_BREAK_COLUMN} ASC",
            self.column,
            self.direction.as_sql()
        )
    }
}

/// Convert sort order string to a direction; anything but ASC is DESC.
fn parse_direction(sort_order: Option<&str>) -> Direction {
    match sort_order.map(str::trim) {
        Some(order) if order.eq_ignore_ascii_case("ASC") => Direction::Asc,
        _ => Direction::Desc,
    }
}

/// Resolve the combined `sort` values used by the listing sort dropdown,
/// e.g. `price_asc`, `year_desc`, `newest`, `oldest`.
fn parse_combined_sort(schema: &EntitySchema, sort: &str) -> Option<SortSpec> {
    let sort = sort.trim();
    if sort.eq_ignore_ascii_case("newest") {
        return Some(SortSpec::default());
    }
    if sort.eq_ignore_ascii_case("oldest") {
        return Some(SortSpec {
            column: DEFAULT_SORT_COLUMN,
            direction: Direction::Asc,
        });
    }
    let (key, order) = sort.rsplit_once('_')?;
    if !order.eq_ignore_ascii_case("asc") && !order.eq_ignore_ascii_case("desc") {
        return None;
    }
    schema.sortable_column(key).map(|column| SortSpec {
        column,
        direction: parse_direction(Some(order)),
    })
}

/// Resolve client sort parameters against the entity's allow-list.
///
/// `sort_by` wins over the combined `sort` form. Unknown columns fall back
/// to the default `created_at DESC` as a whole; a known column with a
/// missing or invalid `sort_order` sorts descending.
#[must_use]
pub fn resolve_sort(
    schema: &EntitySchema,
    sort_by: Option<&str>,
    sort_order: Option<&str>,
    sort: Option<&str>,
) -> SortSpec {
    if let Some(sort_by) = sort_by.map(str::trim).filter(|value| !value.is_empty()) {
        return match schema.sortable_column(sort_by) {
            Some(column) => SortSpec {
                column,
                direction: parse_direction(sort_order),
            },
            None => {
                tracing::debug!(entity = schema.plural, sort_by, "falling back to default sort");
                SortSpec::default()
            }
        };
    }

    sort.and_then(|sort| parse_combined_sort(schema, sort))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::schema::CARS;

    #[test]
    fn test_default_is_newest_first() {
        let spec = resolve_sort(&CARS, None, None, None);
        assert_eq!(spec.column, "created_at");
        assert_eq!(spec.direction, Direction::Desc);
        assert_eq!(spec.order_by_clause(), "created_at DESC, id ASC");
    }

    #[test]
    fn test_order_is_case_insensitive() {
        assert_eq!(
            resolve_sort(&CARS, Some("price"), Some("asc"), None).direction,
            Direction::Asc
        );
        assert_eq!(
            resolve_sort(&CARS, Some("price"), Some("Desc"), None).direction,
            Direction::Desc
        );
    }

    #[test]
    fn test_invalid_order_defaults_to_desc() {
        let spec = resolve_sort(&CARS, Some("year"), Some("sideways"), None);
        assert_eq!(spec.column, "year");
        assert_eq!(spec.direction, Direction::Desc);
    }

    #[test]
    fn test_unknown_column_falls_back_entirely() {
        let spec = resolve_sort(&CARS, Some("brand; DROP TABLE cars"), Some("ASC"), None);
        assert_eq!(spec, SortSpec::default());
    }

    #[test]
    fn test_camel_case_alias() {
        let spec = resolve_sort(&CARS, Some("createdAt"), Some("ASC"), None);
        assert_eq!(spec.column, "created_at");
        assert_eq!(spec.direction, Direction::Asc);
    }

    #[test]
    fn test_combined_sort_values() {
        assert_eq!(
            resolve_sort(&CARS, None, None, Some("price_asc")),
            SortSpec {
                column: "price",
                direction: Direction::Asc
            }
        );
        assert_eq!(
            resolve_sort(&CARS, None, None, Some("mileage_desc")).column,
            "mileage"
        );
        assert_eq!(
            resolve_sort(&CARS, None, None, Some("oldest")).direction,
            Direction::Asc
        );
        assert_eq!(
            resolve_sort(&CARS, None, None, Some("created_at_asc")).column,
            "created_at"
        );
        assert_eq!(
            resolve_sort(&CARS, None, None, Some("brand_asc")),
            SortSpec::default()
        );
    }

    #[test]
    fn test_sort_by_takes_priority() {
        let spec = resolve_sort(&CARS, Some("year"), Some("ASC"), Some("price_desc"));
        assert_eq!(spec.column, "year");
    }

    #[test]
    fn test_direction_maps_to_order() {
        assert_eq!(Direction::Asc.order(), Order::Asc);
        assert_eq!(Direction::Desc.order(), Order::Desc);
    }
}
