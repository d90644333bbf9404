//! # Listing operations
//!
//! The request-level layer between the HTTP handlers and [`ListingResource`]:
//! it compiles list queries, validates payloads, and enforces ownership and
//! tier limits before the store is touched.
//!
//! | operation | who may call | checks |
//! |---|---|---|
//! | [`list_listings`] | anyone | filter/page validation |
//! | [`get_listing`] | anyone | 404 when missing |
//! | [`create_listing`] | authenticated seller | payload, seller exists, listing limit |
//! | [`update_listing`] | owner | payload, ownership |
//! | [`delete_listing`] | owner or admin | ownership |

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::core::ListingResource;
use crate::entities::{listings_owned_by, user};
use crate::errors::ApiError;
use crate::filtering::{PageDefaults, PageRequest, QueryPlan};
use crate::models::{ListResponse, ListingQuery};
use crate::validation::Validatable;

fn not_found<R: ListingResource>(id: Uuid) -> ApiError {
    ApiError::not_found(R::KIND.to_string(), Some(id.to_string()))
}

fn map_missing<R: ListingResource>(id: Uuid) -> impl FnOnce(DbErr) -> ApiError {
    move |err| match err {
        DbErr::RecordNotFound(_) => not_found::<R>(id),
        other => ApiError::database(other),
    }
}

/// Run one list request. Returns the page alongside the envelope so the
/// caller can build the `Content-Range` header.
///
/// # Errors
///
/// Validation failures for bad filters or pagination; database errors
/// otherwise. No partial result is ever returned.
pub async fn list_listings<R: ListingResource>(
    db: &DatabaseConnection,
    query: &ListingQuery,
    paging: PageDefaults,
) -> Result<(ListResponse<R>, PageRequest), ApiError> {
    let plan = QueryPlan::compile(R::KIND.schema(), query, paging)?;
    tracing::debug!(
        entity = %R::KIND,
        sql = %plan.select_sql(),
        params = plan.filter.params().len(),
        "listing query"
    );
    // One transaction so the page and the count see the same rows.
    let txn = db.begin().await.map_err(ApiError::database)?;
    let response = R::list(&txn, &plan).await.map_err(ApiError::database)?;
    txn.commit().await.map_err(ApiError::database)?;
    Ok((response, plan.page))
}

/// # Errors
///
/// [`ApiError::NotFound`] when no row has `id`.
pub async fn get_listing<R: ListingResource>(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<R, ApiError> {
    R::get_one(db, id).await.map_err(map_missing::<R>(id))
}

/// Create a listing owned by the caller.
///
/// The seller's current listing count across all vehicle tables is checked
/// against their tier limit inside the same transaction as the insert.
///
/// # Errors
///
/// 422 for invalid payloads, 401 when the token names no known user, 403
/// when the listing limit is reached.
pub async fn create_listing<R: ListingResource>(
    db: &DatabaseConnection,
    caller: AuthUser,
    payload: R::CreateModel,
) -> Result<R, ApiError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let seller = user::find_user(&txn, caller.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    if !seller.is_admin() {
        let owned = listings_owned_by(&txn, seller.id).await?;
        if !seller.can_add_listing(owned) {
            tracing::info!(
                user = %seller.id,
                owned,
                limit = seller.listing_limit,
                "listing limit reached"
            );
            return Err(ApiError::forbidden(format!(
                "Listing limit of {} reached for the {:?} tier",
                seller.listing_limit, seller.tier
            )));
        }
    }

    let created = R::create(&txn, seller.id, payload).await?;
    txn.commit().await?;

    tracing::info!(entity = %R::KIND, id = %created.id(), owner = %seller.id, "listing created");
    Ok(created)
}

/// Partially update a listing. Only its owner may do so.
///
/// # Errors
///
/// 422 for invalid payloads, 404 when missing, 403 for non-owners.
pub async fn update_listing<R: ListingResource>(
    db: &DatabaseConnection,
    caller: AuthUser,
    id: Uuid,
    payload: R::UpdateModel,
) -> Result<R, ApiError> {
    payload.validate()?;

    let existing = get_listing::<R>(db, id).await?;
    if existing.owner_id() != caller.id {
        return Err(ApiError::forbidden(format!(
            "Only the owner may edit this {}",
            R::KIND
        )));
    }

    R::update(db, id, payload).await.map_err(map_missing::<R>(id))
}

/// Delete a listing. Its owner or an admin may do so.
///
/// # Errors
///
/// 404 when missing, 403 for anyone else.
pub async fn delete_listing<R: ListingResource>(
    db: &DatabaseConnection,
    caller: AuthUser,
    id: Uuid,
) -> Result<Uuid, ApiError> {
    let existing = get_listing::<R>(db, id).await?;
    if existing.owner_id() != caller.id && !caller.is_admin() {
        return Err(ApiError::forbidden(format!(
            "Only the owner or an admin may delete this {}",
            R::KIND
        )));
    }

    let deleted = R::delete(db, id).await.map_err(map_missing::<R>(id))?;
    tracing::info!(entity = %R::KIND, id = %deleted, by = %caller.id, "listing deleted");
    Ok(deleted)
}
