use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ListingPatch, NewListing, patch_columns, patch_listing_columns, set_listing_columns};
use crate::core::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
use crate::models::VehicleKind;
use crate::validation::{Validatable, ValidationErrors, ValidationError, validators::validate_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "caravans")]
#[schema(as = Caravan)]
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
    #[schema(example = "Motorhome")]
    pub caravan_type: String,
    pub sleeping_capacity: Option<i32>,
    pub axles: Option<i32>,
    /// Overall length in metres
    pub length_m: Option<f64>,
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
pub struct CaravanCreate {
    #[serde(flatten)]
    pub listing: NewListing,
    pub caravan_type: String,
    pub sleeping_capacity: Option<i32>,
    pub axles: Option<i32>,
    pub length_m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CaravanUpdate {
    #[serde(flatten)]
    pub listing: ListingPatch,
    pub caravan_type: Option<String>,
    pub sleeping_capacity: Option<i32>,
    pub axles: Option<i32>,
    pub length_m: Option<f64>,
}

fn check_layout(
    errors: &mut ValidationErrors,
    sleeping_capacity: Option<i32>,
    axles: Option<i32>,
    length_m: Option<f64>,
) {
    if let Some(sleeping_capacity) = sleeping_capacity {
        errors.check(validate_range("sleeping_capacity", sleeping_capacity, Some(0), Some(20)));
    }
    if let Some(axles) = axles {
        errors.check(validate_range("axles", axles, Some(1), Some(4)));
    }
    if let Some(length_m) = length_m {
        if !length_m.is_finite() || length_m <= 0.0 {
            errors.add(ValidationError::new("length_m", "must be a positive length"));
        }
    }
}

impl Validatable for CaravanCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_layout(&mut errors, self.sleeping_capacity, self.axles, self.length_m);
        errors.result()
    }
}

impl Validatable for CaravanUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_layout(&mut errors, self.sleeping_capacity, self.axles, self.length_m);
        errors.result()
    }
}

impl IntoListingActiveModel<ActiveModel> for CaravanCreate {
    fn into_listing(self, id: Uuid, owner: Uuid, now: DateTime<Utc>) -> ActiveModel {
        let mut active = ActiveModel {
            id: Set(id),
            user_id: Set(owner),
            caravan_type: Set(self.caravan_type),
            sleeping_capacity: Set(self.sleeping_capacity),
            axles: Set(self.axles),
            length_m: Set(self.length_m),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_listing_columns!(active, self.listing);
        active
    }
}

impl MergeIntoActiveModel<ActiveModel> for CaravanUpdate {
    fn merge_into_activemodel(self, mut target: ActiveModel, now: DateTime<Utc>) -> ActiveModel {
        patch_listing_columns!(target, self.listing);
        patch_columns!(target, self; caravan_type, sleeping_capacity, axles, length_m);
        target.updated_at = Set(now);
        target
    }
}

impl ListingResource for Model {
    type EntityType = Entity;
    type ActiveModelType = ActiveModel;
    type CreateModel = CaravanCreate;
    type UpdateModel = CaravanUpdate;

    const KIND: VehicleKind = VehicleKind::Caravan;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
