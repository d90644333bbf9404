use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ListingPatch, NewListing, patch_columns, patch_listing_columns, set_listing_columns};
use crate::core::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
use crate::models::VehicleKind;
use crate::validation::{Validatable, ValidationErrors, validators::validate_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "ebikes")]
#[schema(as = EBike)]
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
    #[schema(example = "Trekking")]
    pub ebike_type: String,
    /// Watts
    pub motor_power: Option<i32>,
    /// Watt-hours
    pub battery_capacity: Option<i32>,
    pub range_km: Option<i32>,
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
pub struct EBikeCreate {
    #[serde(flatten)]
    pub listing: NewListing,
    pub ebike_type: String,
    pub motor_power: Option<i32>,
    pub battery_capacity: Option<i32>,
    pub range_km: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EBikeUpdate {
    #[serde(flatten)]
    pub listing: ListingPatch,
    pub ebike_type: Option<String>,
    pub motor_power: Option<i32>,
    pub battery_capacity: Option<i32>,
    pub range_km: Option<i32>,
}

fn check_drive(errors: &mut ValidationErrors, values: [(&str, Option<i32>); 3]) {
    for (field, value) in values {
        if let Some(value) = value {
            errors.check(validate_range(field, value, Some(0), None));
        }
    }
}

impl Validatable for EBikeCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_drive(
            &mut errors,
            [
                ("motor_power", self.motor_power),
                ("battery_capacity", self.battery_capacity),
                ("range_km", self.range_km),
            ],
        );
        errors.result()
    }
}

impl Validatable for EBikeUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_drive(
            &mut errors,
            [
                ("motor_power", self.motor_power),
                ("battery_capacity", self.battery_capacity),
                ("range_km", self.range_km),
            ],
        );
        errors.result()
    }
}

impl IntoListingActiveModel<ActiveModel> for EBikeCreate {
    fn into_listing(self, id: Uuid, owner: Uuid, now: DateTime<Utc>) -> ActiveModel {
        let mut active = ActiveModel {
            id: Set(id),
            user_id: Set(owner),
            ebike_type: Set(self.ebike_type),
            motor_power: Set(self.motor_power),
            battery_capacity: Set(self.battery_capacity),
            range_km: Set(self.range_km),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_listing_columns!(active, self.listing);
        active
    }
}

impl MergeIntoActiveModel<ActiveModel> for EBikeUpdate {
    fn merge_into_activemodel(self, mut target: ActiveModel, now: DateTime<Utc>) -> ActiveModel {
        patch_listing_columns!(target, self.listing);
        patch_columns!(target, self; ebike_type, motor_power, battery_capacity, range_km);
        target.updated_at = Set(now);
        target
    }
}

impl ListingResource for Model {
    type EntityType = Entity;
    type ActiveModelType = ActiveModel;
    type CreateModel = EBikeCreate;
    type UpdateModel = EBikeUpdate;

    const KIND: VehicleKind = VehicleKind::EBike;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
