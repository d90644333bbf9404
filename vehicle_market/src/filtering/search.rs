use super::conditions::{Predicate, escape_like, is_unconstrained};
use super::schema::EntitySchema;

/// Build the free-text predicate for the `q` parameter.
///
/// The term is matched as a case-insensitive substring against every
/// searchable column of the entity, OR'ed together. Blank terms and the
/// `Any` sentinel produce no predicate.
#[must_use]
pub fn build_search_predicate(schema: &EntitySchema, term: &str) -> Option<Predicate> {
    if is_unconstrained(term) || schema.searchable.is_empty() {
        return None;
    }
    Some(Predicate::Search {
        columns: schema.searchable,
        pattern: format!("%{}%", escape_like(term.trim())),
    })
}
