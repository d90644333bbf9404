use sea_orm::{
    Condition, Value,
    sea_query::{Alias, BinOper, Expr, Func, SimpleExpr},
};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::schema::{Comparison, EntitySchema, FieldSpec, ValueKind};
use super::search::build_search_predicate;

// Basic safety limits
pub const MAX_FIELD_VALUE_LENGTH: usize = 256;

/// Sentinel the client sends for "no constraint" on select inputs.
const ANY_SENTINEL: &str = "any";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("{param} must be a number, got '{value}'")]
    InvalidNumber { param: String, value: String },
    #[error("{param} must be a UUID, got '{value}'")]
    InvalidUuid { param: String, value: String },
    #[error("{param} exceeds {} characters", MAX_FIELD_VALUE_LENGTH)]
    ValueTooLong { param: String },
}

/// Every problem found in one filter set, reported together.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid filters: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
pub struct FilterRejection(pub Vec<FilterError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    AtLeast,
    AtMost,
}

impl Bound {
    const fn operator(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }
}

/// One compiled comparison. Case-insensitive predicates keep the raw text;
/// `UPPER` is applied to both sides in SQL so the store folds them alike.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals {
        column: &'static str,
        value: Value,
        ignore_case: bool,
    },
    OneOf {
        column: &'static str,
        values: Vec<Value>,
        ignore_case: bool,
    },
    Contains {
        column: &'static str,
        pattern: String,
    },
    Range {
        column: &'static str,
        bound: Bound,
        value: Value,
        /// Also match rows where the column is NULL.
        or_null: bool,
    },
    Search {
        columns: &'static [&'static str],
        pattern: String,
    },
}

fn column_expr(column: &'static str, ignore_case: bool) -> Expr {
    if ignore_case {
        Expr::expr(Func::upper(Expr::col(Alias::new(column))))
    } else {
        Expr::col(Alias::new(column))
    }
}

fn value_expr(value: Value, ignore_case: bool) -> SimpleExpr {
    if ignore_case {
        Func::upper(Expr::val(value)).into()
    } else {
        Expr::val(value).into()
    }
}

fn column_sql(column: &str, ignore_case: bool) -> String {
    if ignore_case {
        format!("UPPER({column})")
    } else {
        column.to_string()
    }
}

const fn placeholder(ignore_case: bool) -> &'static str {
    if ignore_case { "UPPER(?)" } else { "?" }
}

/// `UPPER(col) LIKE UPPER(?) ESCAPE '\'`.
pub(crate) fn like_expr(column: &'static str, pattern: &str) -> SimpleExpr {
    let pattern = SimpleExpr::Binary(
        Box::new(value_expr(Value::from(pattern.to_string()), true)),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant(Value::from('\\'))),
    );
    column_expr(column, true).binary(BinOper::Like, pattern)
}

fn like_sql(column: &str) -> String {
    format!("UPPER({column}) LIKE UPPER(?) ESCAPE '\\'")
}

impl Predicate {
    #[must_use]
    pub fn column(&self) -> Option<&'static str> {
        match self {
            Self::Equals { column, .. }
            | Self::OneOf { column, .. }
            | Self::Contains { column, .. }
            | Self::Range { column, .. } => Some(*column),
            Self::Search { .. } => None,
        }
    }

    /// SQL fragment with `?` placeholders, in the order [`Self::params`]
    /// yields values.
    #[must_use]
    pub fn fragment(&self) -> String {
        match self {
            Self::Equals {
                column,
                ignore_case,
                ..
            } => format!(
                "{} = {}",
                column_sql(column, *ignore_case),
                placeholder(*ignore_case)
            ),
            Self::OneOf {
                column,
                values,
                ignore_case,
            } => {
                let placeholders = vec![placeholder(*ignore_case); values.len()].join(", ");
                format!("{} IN ({placeholders})", column_sql(column, *ignore_case))
            }
            Self::Contains { column, .. } => like_sql(column),
            Self::Range {
                column,
                bound,
                or_null: false,
                ..
            } => format!("{column} {} ?", bound.operator()),
            Self::Range {
                column,
                bound,
                or_null: true,
                ..
            } => format!("({column} {} ? OR {column} IS NULL)", bound.operator()),
            Self::Search { columns, .. } => {
                let mut sql = String::from("(");
                for (index, column) in columns.iter().enumerate() {
                    if index > 0 {
                        sql.push_str(" OR ");
                    }
                    sql.push_str(&like_sql(column));
                }
                sql.push(')');
                sql
            }
        }
    }

    #[must_use]
    pub fn params(&self) -> Vec<Value> {
        match self {
            Self::Equals { value, .. } | Self::Range { value, .. } => vec![value.clone()],
            Self::OneOf { values, .. } => values.clone(),
            Self::Contains { pattern, .. } => vec![Value::from(pattern.clone())],
            Self::Search { columns, pattern } => {
                columns.iter().map(|_| Value::from(pattern.clone())).collect()
            }
        }
    }

    #[must_use]
    pub fn to_condition(&self) -> Condition {
        match self {
            Self::Equals {
                column,
                value,
                ignore_case,
            } => Condition::all().add(
                column_expr(*column, *ignore_case).eq(value_expr(value.clone(), *ignore_case)),
            ),
            Self::OneOf {
                column,
                values,
                ignore_case,
            } => Condition::all().add(
                column_expr(*column, *ignore_case).is_in(
                    values
                        .iter()
                        .map(|value| value_expr(value.clone(), *ignore_case)),
                ),
            ),
            Self::Contains { column, pattern } => Condition::all().add(like_expr(*column, pattern)),
            Self::Range {
                column,
                bound,
                value,
                or_null,
            } => {
                let col = Expr::col(Alias::new(*column));
                let compared = match bound {
                    Bound::AtLeast => col.gte(value.clone()),
                    Bound::AtMost => col.lte(value.clone()),
                };
                if *or_null {
                    Condition::any()
                        .add(compared)
                        .add(Expr::col(Alias::new(*column)).is_null())
                } else {
                    Condition::all().add(compared)
                }
            }
            Self::Search { columns, pattern } => columns
                .iter()
                .fold(Condition::any(), |any, column| {
                    any.add(like_expr(*column, pattern))
                }),
        }
    }
}

/// The AND of every predicate compiled from one filter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    pub predicates: Vec<Predicate>,
}

impl CompiledFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        self.predicates.iter().map(Predicate::fragment).collect()
    }

    #[must_use]
    pub fn params(&self) -> Vec<Value> {
        self.predicates.iter().flat_map(Predicate::params).collect()
    }

    /// The WHERE clause body; `1=1` when nothing constrains the query.
    #[must_use]
    pub fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            "1=1".to_string()
        } else {
            self.fragments().join(" AND ")
        }
    }

    #[must_use]
    pub fn condition(&self) -> Condition {
        self.predicates
            .iter()
            .fold(Condition::all(), |all, predicate| {
                all.add(predicate.to_condition())
            })
    }
}

/// True when a raw value means "no constraint".
#[must_use]
pub fn is_unconstrained(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ANY_SENTINEL)
}

/// Escape LIKE wildcards so user input matches literally.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_value(field: &FieldSpec, raw: &str) -> Result<Value, FilterError> {
    let invalid_number = || FilterError::InvalidNumber {
        param: field.param.to_string(),
        value: raw.to_string(),
    };
    match field.kind {
        ValueKind::Text => Ok(Value::from(raw.to_string())),
        ValueKind::Integer => raw.parse::<i64>().map(Value::from).map_err(|_| invalid_number()),
        ValueKind::Real => match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(Value::from(number)),
            _ => Err(invalid_number()),
        },
        ValueKind::Uuid => Uuid::parse_str(raw)
            .map(Value::from)
            .map_err(|_| FilterError::InvalidUuid {
                param: field.param.to_string(),
                value: raw.to_string(),
            }),
    }
}

fn compile_equals(field: &FieldSpec, raw: &str) -> Result<Option<Predicate>, FilterError> {
    let ignore_case = field.kind == ValueKind::Text;
    let mut values = Vec::new();
    for part in raw.split(',') {
        if is_unconstrained(part) {
            continue;
        }
        values.push(parse_value(field, part.trim())?);
    }
    Ok(match values.len() {
        0 => None,
        1 => values.pop().map(|value| Predicate::Equals {
            column: field.column,
            value,
            ignore_case,
        }),
        _ => Some(Predicate::OneOf {
            column: field.column,
            values,
            ignore_case,
        }),
    })
}

fn compile_field(field: &FieldSpec, raw: &str) -> Result<Option<Predicate>, FilterError> {
    if raw.len() > MAX_FIELD_VALUE_LENGTH {
        return Err(FilterError::ValueTooLong {
            param: field.param.to_string(),
        });
    }
    if is_unconstrained(raw) {
        return Ok(None);
    }
    let trimmed = raw.trim();
    match field.comparison {
        Comparison::Equals => compile_equals(field, trimmed),
        Comparison::Contains => Ok(Some(Predicate::Contains {
            column: field.column,
            pattern: format!("%{}%", escape_like(trimmed)),
        })),
        Comparison::AtLeast | Comparison::AtMost | Comparison::AtMostOrUnset => {
            let bound = if field.comparison == Comparison::AtLeast {
                Bound::AtLeast
            } else {
                Bound::AtMost
            };
            parse_value(field, trimmed).map(|value| {
                Some(Predicate::Range {
                    column: field.column,
                    bound,
                    value,
                    or_null: field.comparison == Comparison::AtMostOrUnset,
                })
            })
        }
    }
}

/// Compile a sparse filter map against an entity's allow-list.
///
/// Predicates come out in schema order, so the same filter set always
/// yields the same SQL. Keys the schema does not know are dropped, as are
/// empty values and the `Any` sentinel. Malformed numbers and UUIDs are
/// collected and returned together instead of reaching the store.
///
/// # Errors
///
/// Returns a [`FilterRejection`] listing every value that failed to parse.
pub fn compile_filters(
    schema: &EntitySchema,
    filters: &BTreeMap<String, String>,
    search: Option<&str>,
) -> Result<CompiledFilter, FilterRejection> {
    let mut predicates = Vec::new();
    let mut errors = Vec::new();

    for field in schema.all_fields() {
        let Some(raw) = filters.get(field.param) else {
            continue;
        };
        match compile_field(field, raw) {
            Ok(Some(predicate)) => predicates.push(predicate),
            Ok(None) => {}
            Err(error) => errors.push(error),
        }
    }

    for key in filters.keys() {
        if schema.field(key).is_none() {
            tracing::debug!(entity = schema.plural, param = %key, "ignoring unknown filter");
        }
    }

    if let Some(term) = search {
        if term.len() > MAX_FIELD_VALUE_LENGTH {
            errors.push(FilterError::ValueTooLong {
                param: "q".to_string(),
            });
        } else if let Some(predicate) = build_search_predicate(schema, term) {
            predicates.push(predicate);
        }
    }

    if errors.is_empty() {
        Ok(CompiledFilter { predicates })
    } else {
        Err(FilterRejection(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::schema::{CARS, MOTORCYCLES, TRUCKS};

    fn filters(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_empty_filters_compile_to_tautology() {
        let compiled = compile_filters(&CARS, &BTreeMap::new(), None).unwrap();
        assert!(compiled.is_empty());
        assert_eq!(compiled.where_clause(), "1=1");
        assert!(compiled.params().is_empty());
    }

    #[test]
    fn test_brand_and_price_range() {
        let compiled = compile_filters(
            &CARS,
            &filters(&[("brand", "BMW"), ("minPrice", "20000"), ("maxPrice", "40000")]),
            None,
        )
        .unwrap();
        assert_eq!(
            compiled.fragments(),
            vec!["UPPER(brand) = UPPER(?)", "price >= ?", "price <= ?"]
        );
        assert_eq!(
            compiled.params(),
            vec![
                Value::from("BMW".to_string()),
                Value::from(20000.0_f64),
                Value::from(40000.0_f64)
            ]
        );
    }

    #[test]
    fn test_order_follows_schema_not_input() {
        let compiled = compile_filters(
            &CARS,
            &filters(&[("maxYear", "2020"), ("fuelType", "Diesel"), ("minYear", "2010")]),
            None,
        )
        .unwrap();
        assert_eq!(
            compiled.where_clause(),
            "year >= ? AND year <= ? AND UPPER(fuel_type) = UPPER(?)"
        );
    }

    #[test]
    fn test_empty_and_any_are_dropped() {
        let compiled = compile_filters(
            &CARS,
            &filters(&[("brand", ""), ("condition", "Any"), ("fuelType", "  any ")]),
            None,
        )
        .unwrap();
        assert!(compiled.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let compiled = compile_filters(
            &TRUCKS,
            &filters(&[("bodyType", "SUV"), ("color", "red"), ("brand", "MAN")]),
            None,
        )
        .unwrap();
        assert_eq!(compiled.fragments(), vec!["UPPER(brand) = UPPER(?)"]);
    }

    #[test]
    fn test_comma_list_becomes_in() {
        let compiled =
            compile_filters(&CARS, &filters(&[("fuelType", "Diesel, Electric,Any")]), None)
                .unwrap();
        assert_eq!(
            compiled.fragments(),
            vec!["UPPER(fuel_type) IN (UPPER(?), UPPER(?))"]
        );
        assert_eq!(
            compiled.params(),
            vec![
                Value::from("Diesel".to_string()),
                Value::from("Electric".to_string())
            ]
        );
    }

    #[test]
    fn test_integer_equals_is_exact() {
        let compiled =
            compile_filters(&MOTORCYCLES, &filters(&[("cylinders", "2")]), None).unwrap();
        assert_eq!(compiled.fragments(), vec!["cylinders = ?"]);
        assert_eq!(compiled.params(), vec![Value::from(2_i64)]);
    }

    #[test]
    fn test_model_is_substring_match() {
        let compiled = compile_filters(&CARS, &filters(&[("model", "3 ser")]), None).unwrap();
        assert_eq!(
            compiled.fragments(),
            vec!["UPPER(model) LIKE UPPER(?) ESCAPE '\\'"]
        );
        assert_eq!(compiled.params(), vec![Value::from("%3 ser%".to_string())]);
    }

    #[test]
    fn test_text_values_are_bound_unfolded() {
        let compiled = compile_filters(&CARS, &filters(&[("brand", "Citroën")]), None).unwrap();
        assert_eq!(compiled.params(), vec![Value::from("Citroën".to_string())]);
    }

    #[test]
    fn test_max_mileage_keeps_unset_mileage() {
        let compiled =
            compile_filters(&CARS, &filters(&[("maxMileage", "50000")]), None).unwrap();
        assert_eq!(
            compiled.fragments(),
            vec!["(mileage <= ? OR mileage IS NULL)"]
        );
        assert_eq!(compiled.params(), vec![Value::from(50_000_i64)]);
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_non_numeric_values_are_rejected_together() {
        let rejection = compile_filters(
            &CARS,
            &filters(&[("minPrice", "abc"), ("maxYear", "20x0"), ("brand", "BMW")]),
            None,
        )
        .unwrap_err();
        assert_eq!(rejection.0.len(), 2);
        assert!(rejection.0.contains(&FilterError::InvalidNumber {
            param: "minPrice".to_string(),
            value: "abc".to_string()
        }));
    }

    #[test]
    fn test_non_finite_price_is_rejected() {
        let result = compile_filters(&CARS, &filters(&[("maxPrice", "NaN")]), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_user_id_is_rejected() {
        let rejection =
            compile_filters(&CARS, &filters(&[("userId", "not-a-uuid")]), None).unwrap_err();
        assert!(matches!(rejection.0[0], FilterError::InvalidUuid { .. }));
    }

    #[test]
    fn test_overlong_value_is_rejected() {
        let long = "x".repeat(MAX_FIELD_VALUE_LENGTH + 1);
        let rejection = compile_filters(&CARS, &filters(&[("brand", &long)]), None).unwrap_err();
        assert_eq!(
            rejection.0,
            vec![FilterError::ValueTooLong {
                param: "brand".to_string()
            }]
        );
    }

    #[test]
    fn test_search_is_appended_last() {
        let compiled =
            compile_filters(&CARS, &filters(&[("brand", "Audi")]), Some("quattro")).unwrap();
        assert_eq!(compiled.predicates.len(), 2);
        assert!(compiled.fragments()[1].starts_with("(UPPER(brand) LIKE UPPER(?)"));
        assert_eq!(compiled.params().len(), 1 + CARS.searchable.len());
    }

    #[test]
    fn test_rejection_message_lists_every_error() {
        let rejection = compile_filters(
            &CARS,
            &filters(&[("minPrice", "abc"), ("minYear", "old")]),
            None,
        )
        .unwrap_err();
        let message = rejection.to_string();
        assert!(message.contains("minYear"));
        assert!(message.contains("minPrice"));
    }
}
