use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ListingPatch, NewListing, patch_columns, patch_listing_columns, set_listing_columns};
use crate::core::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
use crate::models::VehicleKind;
use crate::validation::{Validatable, ValidationErrors, validators::validate_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "cars")]
#[schema(as = Car)]
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
    #[schema(example = "Estate")]
    pub body_type: String,
    #[schema(example = "Diesel")]
    pub fuel_type: String,
    #[schema(example = "Automatic")]
    pub transmission: String,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
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
pub struct CarCreate {
    #[serde(flatten)]
    pub listing: NewListing,
    pub body_type: String,
    pub fuel_type: String,
    pub transmission: String,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CarUpdate {
    #[serde(flatten)]
    pub listing: ListingPatch,
    pub body_type: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
}

fn check_cabin(errors: &mut ValidationErrors, doors: Option<i32>, seats: Option<i32>) {
    if let Some(doors) = doors {
        errors.check(validate_range("doors", doors, Some(1), Some(9)));
    }
    if let Some(seats) = seats {
        errors.check(validate_range("seats", seats, Some(1), Some(99)));
    }
}

impl Validatable for CarCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_cabin(&mut errors, self.doors, self.seats);
        errors.result()
    }
}

impl Validatable for CarUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.listing.check(&mut errors);
        check_cabin(&mut errors, self.doors, self.seats);
        errors.result()
    }
}

impl IntoListingActiveModel<ActiveModel> for CarCreate {
    fn into_listing(self, id: Uuid, owner: Uuid, now: DateTime<Utc>) -> ActiveModel {
        let mut active = ActiveModel {
            id: Set(id),
            user_id: Set(owner),
            body_type: Set(self.body_type),
            fuel_type: Set(self.fuel_type),
            transmission: Set(self.transmission),
            doors: Set(self.doors),
            seats: Set(self.seats),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_listing_columns!(active, self.listing);
        active
    }
}

impl MergeIntoActiveModel<ActiveModel> for CarUpdate {
    fn merge_into_activemodel(self, mut target: ActiveModel, now: DateTime<Utc>) -> ActiveModel {
        patch_listing_columns!(target, self.listing);
        patch_columns!(target, self; body_type, fuel_type, transmission, doors, seats);
        target.updated_at = Set(now);
        target
    }
}

impl ListingResource for Model {
    type EntityType = Entity;
    type ActiveModelType = ActiveModel;
    type CreateModel = CarCreate;
    type UpdateModel = CarUpdate;

    const KIND: VehicleKind = VehicleKind::Car;

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
    use sea_orm::ActiveValue::NotSet;

    fn create_payload() -> CarCreate {
        serde_json::from_value(serde_json::json!({
            "brand": " BMW ",
            "model": "320d Touring",
            "year": 2019,
            "price": 24900,
            "currency": "eur",
            "mileage": 61000,
            "condition": "Used",
            "country": "Germany",
            "city": "Munich",
            "images": ["/img/1.jpg"],
            "body_type": "Estate",
            "fuel_type": "Diesel",
            "transmission": "Automatic",
            "doors": 5
        }))
        .unwrap()
    }

    #[test]
    fn test_create_payload_accepts_flat_json() {
        let payload = create_payload();
        assert_eq!(payload.listing.brand, " BMW ");
        assert_eq!(payload.body_type, "Estate");
        assert_eq!(payload.seats, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_into_listing_sets_server_columns() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let active = create_payload().into_listing(id, owner, now);
        assert_eq!(active.id, Set(id));
        assert_eq!(active.user_id, Set(owner));
        assert_eq!(active.brand, Set("BMW".to_string()));
        assert_eq!(active.currency, Set("EUR".to_string()));
        assert_eq!(active.images, Set(r#"["/img/1.jpg"]"#.to_string()));
        assert_eq!(active.created_at, Set(now));
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let update: CarUpdate =
            serde_json::from_value(serde_json::json!({"price": 21000, "doors": 3})).unwrap();
        let now = Utc::now();
        let active = update.merge_into_activemodel(<ActiveModel as Default>::default(), now);
        assert_eq!(active.price, Set(21_000.0));
        assert_eq!(active.doors, Set(Some(3)));
        assert_eq!(active.brand, NotSet);
        assert_eq!(active.user_id, NotSet);
        assert_eq!(active.updated_at, Set(now));
    }

    #[test]
    fn test_invalid_doors_rejected() {
        let update = CarUpdate {
            doors: Some(0),
            ..CarUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_model_serializes_images_as_array() {
        let now = Utc::now();
        let car = Model {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            brand: "Audi".to_string(),
            model: "A4".to_string(),
            year: 2020,
            price: 30_000.0,
            currency: "EUR".to_string(),
            mileage: None,
            condition: "New".to_string(),
            country: "Austria".to_string(),
            city: "Graz".to_string(),
            description: String::new(),
            images: r#"["/a.jpg"]"#.to_string(),
            body_type: "Sedan".to_string(),
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            doors: Some(4),
            seats: Some(5),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&car).unwrap();
        assert_eq!(json["images"], serde_json::json!(["/a.jpg"]));
        assert!(json["mileage"].is_null());
        let back: Model = serde_json::from_value(json).unwrap();
        assert_eq!(back, car);
    }
}
