//! Store connection and schema bootstrap.
//!
//! Tables are created from the entity definitions, so the schema never
//! drifts from the models. Every vehicle table also gets B-tree indexes on
//! the owner column and on the sortable columns the list endpoints use.

use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    sea_query::{Alias, Index},
};

use crate::entities::{caravan, car, ebike, motorcycle, truck, user};
use crate::models::VehicleKind;

/// Columns indexed on every vehicle table.
const INDEXED_COLUMNS: &[&str] = &["user_id", "created_at", "price", "year", "mileage", "brand"];

/// Connect to the store.
///
/// # Errors
///
/// Returns the driver error when the URL is invalid or unreachable.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    tracing::info!(backend = ?db.get_database_backend(), "connected to database");
    Ok(db)
}

async fn create_table<C: ConnectionTrait, E: EntityTrait>(
    db: &C,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement))
        .await?;
    Ok(())
}

async fn create_indexes<C: ConnectionTrait>(db: &C, table: &str) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for column in INDEXED_COLUMNS {
        let statement = Index::create()
            .if_not_exists()
            .name(format!("idx_{table}_{column}"))
            .table(Alias::new(table))
            .col(Alias::new(*column))
            .to_owned();
        db.execute(backend.build(&statement)).await?;
    }
    Ok(())
}

/// Create every table and index that does not exist yet. Safe to run on
/// each startup.
///
/// # Errors
///
/// Returns the first DDL statement that fails.
pub async fn setup_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, truck::Entity).await?;
    create_table(db, &schema, car::Entity).await?;
    create_table(db, &schema, motorcycle::Entity).await?;
    create_table(db, &schema, ebike::Entity).await?;
    create_table(db, &schema, caravan::Entity).await?;

    for kind in VehicleKind::ALL {
        create_indexes(db, kind.schema().table).await?;
    }

    tracing::debug!("schema ready");
    Ok(())
}
