use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Subscription tier; decides how many listings a seller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "premium")]
    Premium,
    #[sea_orm(string_value = "professional")]
    Professional,
}

impl Tier {
    #[must_use]
    pub const fn listing_limit(self) -> i32 {
        match self {
            Self::Free => 3,
            Self::Premium => 10,
            Self::Professional => 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub tier: Tier,
    pub listing_limit: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this user may hold `owned + 1` listings. Admins are unbounded.
    #[must_use]
    pub fn can_add_listing(&self, owned: u64) -> bool {
        self.is_admin() || owned < u64::try_from(self.listing_limit).unwrap_or(0)
    }
}

/// A new seller row with the listing limit derived from `tier`.
#[must_use]
pub fn new_user(email: &str, password_hash: &str, role: Role, tier: Tier) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.trim().to_lowercase()),
        password: Set(password_hash.to_string()),
        role: Set(role),
        tier: Set(tier),
        listing_limit: Set(tier.listing_limit()),
        created_at: Set(Utc::now()),
    }
}

/// Look up a seller by id.
///
/// # Errors
///
/// Returns the store error, if any; a missing row is `Ok(None)`.
pub async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(db).await
}
