use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ListingPatch, NewListing, patch_columns, patch_listing_columns, set_listing_columns};
use crate::core::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
use crate::models::VehicleKind;
use crate::validation::{Validatable, ValidationErrors, validators::validate_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "motorcycles")]
#[schema(as = Motorcycle)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub currency: String,
    pub mileage: Option<i32>,
    pub condition: String,
    pub country: String,
    pub city: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    #[serde(with = "super::images_json")]
    #[schema(value_type = Vec<String>)]
    pub images: String,
    #[schema(example = "Naked")]
    pub motorcycle_type: String,
    /// Displacement in cc
    pub engine_size: Option<i32>,
    pub cylinders: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MotorcycleCreate {
    #[serde(flatten)]
    pub listing: NewListing,
    pub motorcycle_type: String,
    pub engine_size: Option<i32>,
    pub cylinders: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MotorcycleUpdate {
    #[serde(flatten)]
    pub listing: ListingPatch,
    pub motorcycle_type: Option<String>,
    pub engine_size: Option<i32>,
    pub cylinders: Option<i32>,
}

fn check_engine(errors: &mut ValidationErrors, engine_size: Option<i32>, cylinders: Option<i32>) {
    if let Some(engine_size) = engine_size {
        errors.check(validate_range("engine_size", engine_size, Some(0), None));
    }
    if let Some(cylinders) = cylinders {
        errors.check(validate_range("cylinders", cylinders, Some(0), Some(12)));
    }
}

impl Validatable for MotorcycleCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_engine(&mut errors, self.engine_size, self.cylinders);
        errors.result()
    }
}

impl Validatable for MotorcycleUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_engine(&mut errors, self.engine_size, self.cylinders);
        errors.result()
    }
}

impl IntoListingActiveModel<ActiveModel> for MotorcycleCreate {
    fn into_listing(self, id: Uuid, owner: Uuid, now: DateTime<Utc>) -> ActiveModel {
        let mut active = ActiveModel {
            id: Set(id),
            user_id: Set(owner),
            motorcycle_type: Set(self.motorcycle_type),
            engine_size: Set(self.engine_size),
            cylinders: Set(self.cylinders),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_listing_columns!(active, self.listing);
        active
    }
}

impl MergeIntoActiveModel<ActiveModel> for MotorcycleUpdate {
    fn merge_into_activemodel(self, mut target: ActiveModel, now: DateTime<Utc>) -> ActiveModel {
        patch_listing_columns!(target, self.listing);
        patch_columns!(target, self; motorcycle_type, engine_size, cylinders);
        target.updated_at = Set(now);
        target
    }
}

impl ListingResource for Model {
    type EntityType = Entity;
    type ActiveModelType = ActiveModel;
    type CreateModel = MotorcycleCreate;
    type UpdateModel = MotorcycleUpdate;

    const KIND: VehicleKind = VehicleKind::Motorcycle;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
