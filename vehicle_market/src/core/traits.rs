use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Alias, Expr, IntoColumnRef, SimpleExpr},
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::filtering::{QueryPlan, sort::TIE_BREAK_COLUMN};
use crate::models::{ListResponse, VehicleKind};
use crate::validation::Validatable;

const ID_COLUMN: &str = "id";
const OWNER_COLUMN: &str = "user_id";

/// Build a fresh active model from a create payload.
pub trait IntoListingActiveModel<ActiveModelType> {
    /// `id`, owner and timestamps are assigned by the server, never the client.
    fn into_listing(self, id: Uuid, owner: Uuid, now: DateTime<Utc>) -> ActiveModelType;
}

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Set the present fields of this update on `target`, plus `updated_at`.
    /// Fields absent from the update stay `NotSet`.
    fn merge_into_activemodel(self, target: ActiveModelType, now: DateTime<Utc>)
    -> ActiveModelType;
}

fn column(name: &'static str) -> SimpleExpr {
    SimpleExpr::Column(Alias::new(name).into_column_ref())
}

fn id_is(id: Uuid) -> SimpleExpr {
    Expr::col(Alias::new(ID_COLUMN)).eq(id)
}

/// A listing table served by the generic handlers.
///
/// Implemented by each vehicle entity's `Model`. All store access goes
/// through column names from the entity's [`EntitySchema`], so the same
/// default methods serve every table.
///
/// [`EntitySchema`]: crate::filtering::EntitySchema
#[async_trait]
pub trait ListingResource:
    Serialize + Clone + Send + Sync + Sized + FromQueryResult + 'static
{
    type EntityType: EntityTrait<Model = Self> + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType> + Send + Sync + 'static;
    type CreateModel: IntoListingActiveModel<Self::ActiveModelType>
        + Validatable
        + DeserializeOwned
        + Send;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModelType>
        + Validatable
        + DeserializeOwned
        + Send;

    const KIND: VehicleKind;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;

    /// One page of rows matching the plan, plus the unpaginated count of
    /// rows matching the same condition. Pass a transaction to have both
    /// statements read the same snapshot.
    async fn list<C: ConnectionTrait>(
        db: &C,
        plan: &QueryPlan,
    ) -> Result<ListResponse<Self>, DbErr> {
        let condition = plan.filter.condition();

        let items = Self::EntityType::find()
            .filter(condition.clone())
            .order_by(column(plan.sort.column), plan.sort.direction.order())
            .order_by(column(TIE_BREAK_COLUMN), Order::Asc)
            .offset(plan.page.offset)
            .limit(plan.page.limit)
            .all(db)
            .await?;

        let total = Self::EntityType::find().filter(condition).count(db).await?;

        Ok(ListResponse::new(items, total))
    }

    async fn get_one<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Self, DbErr> {
        Self::EntityType::find()
            .filter(id_is(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", Self::KIND)))
    }

    async fn create<C: ConnectionTrait>(
        db: &C,
        owner: Uuid,
        create_model: Self::CreateModel,
    ) -> Result<Self, DbErr> {
        let id = Uuid::new_v4();
        let active_model = create_model.into_listing(id, owner, Utc::now());
        Self::EntityType::insert(active_model).exec(db).await?;
        Self::get_one(db, id).await
    }

    async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        update_model: Self::UpdateModel,
    ) -> Result<Self, DbErr> {
        let changes = update_model
            .merge_into_activemodel(<Self::ActiveModelType as ActiveModelTrait>::default(), Utc::now());
        let result = Self::EntityType::update_many()
            .set(changes)
            .filter(id_is(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("{} not found", Self::KIND)));
        }
        Self::get_one(db, id).await
    }

    async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Uuid, DbErr> {
        let result = Self::EntityType::delete_many()
            .filter(id_is(id))
            .exec(db)
            .await?;
        match result.rows_affected {
            0 => Err(DbErr::RecordNotFound(format!("{} not found", Self::KIND))),
            _ => Ok(id),
        }
    }

    async fn count_owned_by<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
        Self::EntityType::find()
            .filter(Expr::col(Alias::new(OWNER_COLUMN)).eq(user_id))
            .count(db)
            .await
    }
}
