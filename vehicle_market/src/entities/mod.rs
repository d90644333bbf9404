//! Store entities for the five listing tables and their sellers.
//!
//! Every vehicle table shares the columns described by [`NewListing`];
//! type-specific columns live on each entity's `Model`. Payload structs
//! (`*Create`, `*Update`) flatten the shared part so clients send one flat
//! JSON object.

pub mod caravan;
pub mod car;
pub mod ebike;
pub mod motorcycle;
pub mod truck;
pub mod user;

use chrono::Datelike;
use sea_orm::{ConnectionTrait, DbErr};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::ListingResource;
use crate::validation::{
    ValidationErrors,
    validators::{validate_images, validate_length, validate_price, validate_range, validate_required},
};

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const EARLIEST_MODEL_YEAR: i32 = 1900;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Latest model year accepted on a listing: next calendar year.
#[must_use]
pub fn latest_model_year() -> i32 {
    chrono::Utc::now().year() + 1
}

/// Shared columns of a new listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewListing {
    #[schema(example = "BMW")]
    pub brand: String,
    #[schema(example = "320d")]
    pub model: String,
    #[schema(example = 2019)]
    pub year: i32,
    #[schema(example = 24_900.0)]
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub mileage: Option<i32>,
    #[schema(example = "Used")]
    pub condition: String,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewListing {
    /// Record every problem with the shared columns.
    pub fn check(&self, errors: &mut ValidationErrors) {
        errors.check(validate_required("brand", &self.brand));
        errors.check(validate_required("model", &self.model));
        errors.check(validate_required("condition", &self.condition));
        errors.check(validate_length("brand", &self.brand, None, Some(64)));
        errors.check(validate_length("model", &self.model, None, Some(64)));
        errors.check(validate_length("currency", &self.currency, Some(3), Some(3)));
        errors.check(validate_range(
            "year",
            self.year,
            Some(EARLIEST_MODEL_YEAR),
            Some(latest_model_year()),
        ));
        errors.check(validate_price("price", self.price));
        if let Some(mileage) = self.mileage {
            errors.check(validate_range("mileage", mileage, Some(0), None));
        }
        errors.check(validate_images("images", &self.images));
    }
}

/// Shared columns of a partial listing update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListingPatch {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub mileage: Option<i32>,
    pub condition: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

impl ListingPatch {
    pub fn check(&self, errors: &mut ValidationErrors) {
        if let Some(brand) = &self.brand {
            errors.check(validate_required("brand", brand));
        }
        if let Some(model) = &self.model {
            errors.check(validate_required("model", model));
        }
        if let Some(currency) = &self.currency {
            errors.check(validate_length("currency", currency, Some(3), Some(3)));
        }
        if let Some(year) = self.year {
            errors.check(validate_range(
                "year",
                year,
                Some(EARLIEST_MODEL_YEAR),
                Some(latest_model_year()),
            ));
        }
        if let Some(price) = self.price {
            errors.check(validate_price("price", price));
        }
        if let Some(mileage) = self.mileage {
            errors.check(validate_range("mileage", mileage, Some(0), None));
        }
        if let Some(images) = &self.images {
            errors.check(validate_images("images", images));
        }
    }
}

/// `images` is stored as JSON text and exposed as an array.
pub mod images_json {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[must_use]
    pub fn encode(images: &[String]) -> String {
        serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
    }

    /// Malformed stored text decodes to no images.
    #[must_use]
    pub fn decode(raw: &str) -> Vec<String> {
        serde_json::from_str(raw).unwrap_or_default()
    }

    pub fn serialize<S: Serializer>(raw: &str, serializer: S) -> Result<S::Ok, S::Error> {
        decode(raw).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Vec::<String>::deserialize(deserializer).map(|images| encode(&images))
    }
}

/// Copy the shared columns of a [`NewListing`] into an active model.
macro_rules! set_listing_columns {
    ($active:ident, $listing:expr) => {{
        let listing = $listing;
        $active.brand = sea_orm::ActiveValue::Set(listing.brand.trim().to_string());
        $active.model = sea_orm::ActiveValue::Set(listing.model.trim().to_string());
        $active.year = sea_orm::ActiveValue::Set(listing.year);
        $active.price = sea_orm::ActiveValue::Set(listing.price);
        $active.currency = sea_orm::ActiveValue::Set(listing.currency.to_uppercase());
        $active.mileage = sea_orm::ActiveValue::Set(listing.mileage);
        $active.condition = sea_orm::ActiveValue::Set(listing.condition);
        $active.country = sea_orm::ActiveValue::Set(listing.country);
        $active.city = sea_orm::ActiveValue::Set(listing.city);
        $active.description = sea_orm::ActiveValue::Set(listing.description);
        $active.images =
            sea_orm::ActiveValue::Set($crate::entities::images_json::encode(&listing.images));
    }};
}

/// Set each listed column whose patch value is present.
macro_rules! patch_columns {
    ($active:ident, $patch:expr; $($field:ident),* $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $active.$field = sea_orm::ActiveValue::Set(value.into());
            }
        )*
    };
}

/// Apply a [`ListingPatch`] to an active model.
macro_rules! patch_listing_columns {
    ($active:ident, $patch:expr) => {{
        let patch = $patch;
        $crate::entities::patch_columns!($active, patch; brand, model, year, price, mileage, condition, country, city, description);
        if let Some(currency) = patch.currency {
            $active.currency = sea_orm::ActiveValue::Set(currency.to_uppercase());
        }
        if let Some(images) = patch.images {
            $active.images =
                sea_orm::ActiveValue::Set($crate::entities::images_json::encode(&images));
        }
    }};
}

pub(crate) use patch_columns;
pub(crate) use patch_listing_columns;
pub(crate) use set_listing_columns;

/// Listings owned by `user_id` across all five vehicle tables.
///
/// # Errors
///
/// Returns any store error from the per-table counts.
pub async fn listings_owned_by<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
    Ok(truck::Model::count_owned_by(db, user_id).await?
        + car::Model::count_owned_by(db, user_id).await?
        + motorcycle::Model::count_owned_by(db, user_id).await?
        + ebike::Model::count_owned_by(db, user_id).await?
        + caravan::Model::count_owned_by(db, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> NewListing {
        NewListing {
            brand: "Volvo".to_string(),
            model: "V60".to_string(),
            year: 2018,
            price: 18_500.0,
            currency: "EUR".to_string(),
            mileage: Some(84_000),
            condition: "Used".to_string(),
            country: "Sweden".to_string(),
            city: "Gothenburg".to_string(),
            description: String::new(),
            images: vec![],
        }
    }

    #[test]
    fn test_valid_listing_passes() {
        let mut errors = ValidationErrors::new();
        listing().check(&mut errors);
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_invalid_listing_reports_every_field() {
        let mut errors = ValidationErrors::new();
        NewListing {
            brand: String::new(),
            year: 1850,
            price: -5.0,
            mileage: Some(-1),
            ..listing()
        }
        .check(&mut errors);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["brand", "year", "price", "mileage"]);
    }

    #[test]
    fn test_next_year_is_accepted() {
        let mut errors = ValidationErrors::new();
        NewListing {
            year: latest_model_year(),
            ..listing()
        }
        .check(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_patch_is_valid() {
        let mut errors = ValidationErrors::new();
        ListingPatch::default().check(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_currency_defaults_when_missing() {
        let json = serde_json::json!({
            "brand": "Fiat", "model": "500", "year": 2020, "price": 9000,
            "condition": "Used", "country": "Italy", "city": "Turin"
        });
        let listing: NewListing = serde_json::from_value(json).unwrap();
        assert_eq!(listing.currency, "EUR");
        assert!(listing.images.is_empty());
    }

    #[test]
    fn test_images_round_trip_through_text() {
        let images = vec!["/a.jpg".to_string(), "/b.jpg".to_string()];
        let raw = images_json::encode(&images);
        assert_eq!(raw, r#"["/a.jpg","/b.jpg"]"#);
        assert_eq!(images_json::decode(&raw), images);
        assert!(images_json::decode("not json").is_empty());
    }
}
