use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Address;
use crate::schemas::AddressCreateSchema;

// ============================================================================
// Address Module
// ============================================================================
//
// Sibling CRUD module; the order service calls it exactly once per order
// creation. Only the creation path is needed from here.
//
// ============================================================================

/// Insert the delivery address embedded in an order-creation request.
pub async fn create_address(pool: &PgPool, schema: &AddressCreateSchema) -> Result<Address> {
    let address = sqlx::query_as::<_, Address>(
        "INSERT INTO address
            (id, street, house_number, postal_code, town, country, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, street, house_number, postal_code, town, country, first_name, last_name",
    )
    .bind(Uuid::new_v4())
    .bind(&schema.street)
    .bind(&schema.house_number)
    .bind(&schema.postal_code)
    .bind(&schema.town)
    .bind(&schema.country)
    .bind(&schema.first_name)
    .bind(&schema.last_name)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        address_id = %address.id,
        town = %address.town,
        "Address created"
    );

    Ok(address)
}
