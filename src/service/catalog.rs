use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Beverage, PizzaType};

// ============================================================================
// Catalog Lookups
// ============================================================================
//
// The catalog (pizza types, doughs, sauces, beverages) is managed elsewhere;
// the order operations only need to load the entities they are handed ids
// for. Read-only from this service's perspective.
//
// ============================================================================

/// Look up a pizza type by primary key.
pub async fn get_pizza_type_by_id(pool: &PgPool, pizza_type_id: Uuid) -> Result<Option<PizzaType>> {
    let entity = sqlx::query_as::<_, PizzaType>(
        "SELECT id, name, price, description, dough_id FROM pizza_type WHERE id = $1",
    )
    .bind(pizza_type_id)
    .fetch_optional(pool)
    .await?;

    if entity.is_none() {
        tracing::error!(pizza_type_id = %pizza_type_id, "Pizza type not found");
    }

    Ok(entity)
}

/// Look up a beverage by primary key.
pub async fn get_beverage_by_id(pool: &PgPool, beverage_id: Uuid) -> Result<Option<Beverage>> {
    let entity =
        sqlx::query_as::<_, Beverage>("SELECT id, name, price FROM beverage WHERE id = $1")
            .bind(beverage_id)
            .fetch_optional(pool)
            .await?;

    if entity.is_none() {
        tracing::error!(beverage_id = %beverage_id, "Beverage not found");
    }

    Ok(entity)
}
