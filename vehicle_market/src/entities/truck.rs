use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ListingPatch, NewListing, patch_columns, patch_listing_columns, set_listing_columns};
use crate::core::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
use crate::models::VehicleKind;
use crate::validation::{Validatable, ValidationErrors, validators::validate_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "trucks")]
#[schema(as = Truck)]
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
    /// Tractor unit, box truck, tipper, ...
    #[schema(example = "Tractor Unit")]
    pub truck_type: String,
    pub fuel_type: String,
    pub transmission: String,
    /// Payload in kilograms
    pub payload_capacity: Option<i32>,
    pub axles: Option<i32>,
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
pub struct TruckCreate {
    #[serde(flatten)]
    pub listing: NewListing,
    pub truck_type: String,
    pub fuel_type: String,
    pub transmission: String,
    pub payload_capacity: Option<i32>,
    pub axles: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TruckUpdate {
    #[serde(flatten)]
    pub listing: ListingPatch,
    pub truck_type: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub payload_capacity: Option<i32>,
    pub axles: Option<i32>,
}

fn check_chassis(errors: &mut ValidationErrors, payload: Option<i32>, axles: Option<i32>) {
    if let Some(payload) = payload {
        errors.check(validate_range("payload_capacity", payload, Some(0), None));
    }
    if let Some(axles) = axles {
        errors.check(validate_range("axles", axles, Some(2), Some(10)));
    }
}

impl Validatable for TruckCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_chassis(&mut errors, self.payload_capacity, self.axles);
        errors.result()
    }
}

impl Validatable for TruckUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_chassis(&mut errors, self.payload_capacity, self.axles);
        errors.result()
    }
}

impl IntoListingActiveModel<ActiveModel> for TruckCreate {
    fn into_listing(self, id: Uuid, owner: Uuid, now: DateTime<Utc>) -> ActiveModel {
        let mut active = ActiveModel {
            id: Set(id),
            user_id: Set(owner),
            truck_type: Set(self.truck_type),
            fuel_type: Set(self.fuel_type),
            transmission: Set(self.transmission),
            payload_capacity: Set(self.payload_capacity),
            axles: Set(self.axles),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_listing_columns!(active, self.listing);
        active
    }
}

impl MergeIntoActiveModel<ActiveModel> for TruckUpdate {
    fn merge_into_activemodel(self, mut target: ActiveModel, now: DateTime<Utc>) -> ActiveModel {
        patch_listing_columns!(target, self.listing);
        patch_columns!(target, self; truck_type, fuel_type, transmission, payload_capacity, axles);
        target.updated_at = Set(now);
        target
    }
}

impl ListingResource for Model {
    type EntityType = Entity;
    type ActiveModelType = ActiveModel;
    type CreateModel = TruckCreate;
    type UpdateModel = TruckUpdate;

    const KIND: VehicleKind = VehicleKind::Truck;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_axle_truck_is_rejected() {
        let update = TruckUpdate {
            axles: Some(1),
            ..TruckUpdate::default()
        };
        let errors = update.validate().unwrap_err();
        assert_eq!(errors.iter().next().map(|e| e.field.as_str()), Some("axles"));
    }

    #[test]
    fn test_merge_sets_type_column() {
        let update = TruckUpdate {
            truck_type: Some("Tipper".to_string()),
            ..TruckUpdate::default()
        };
        let active = update.merge_into_activemodel(<ActiveModel as Default>::default(), Utc::now());
        assert_eq!(active.truck_type, Set("Tipper".to_string()));
    }
}
