use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;

// ============================================================================
// Database Setup
// ============================================================================
//
// Pool construction plus an idempotent schema bootstrap run once at startup.
// The catalog tables (dough, sauce, pizza_type, beverage) are owned by the
// catalog modules; they are created here too so the service can run against
// an empty database.
//
// ============================================================================

/// Open a connection pool against the configured Postgres instance.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    tracing::info!(url = %database_url, "Connected to Postgres");
    Ok(pool)
}

/// Create the schema if it does not exist yet. Safe to run on every start.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    // Postgres has no CREATE TYPE IF NOT EXISTS
    sqlx::raw_sql(
        "DO $$ BEGIN
            CREATE TYPE order_status AS ENUM
                ('TRANSMITTED', 'PREPARING', 'IN_DELIVERY', 'DELIVERED');
        EXCEPTION
            WHEN duplicate_object THEN NULL;
        END $$",
    )
    .execute(pool)
    .await?;

    for ddl in SCHEMA_DDL {
        sqlx::raw_sql(ddl).execute(pool).await?;
    }

    tracing::info!(statements = SCHEMA_DDL.len() + 1, "Schema bootstrap complete");
    Ok(())
}

// Ordered so that referenced tables exist before their dependents.
const SCHEMA_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS address (
        id UUID PRIMARY KEY,
        street TEXT NOT NULL,
        house_number TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        town TEXT NOT NULL,
        country TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS dough (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sauce (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS pizza_type (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        description TEXT NOT NULL,
        dough_id UUID NOT NULL REFERENCES dough (id)
    )",
    "CREATE TABLE IF NOT EXISTS pizza_type_sauce (
        pizza_type_id UUID NOT NULL REFERENCES pizza_type (id) ON DELETE CASCADE,
        sauce_id UUID NOT NULL REFERENCES sauce (id),
        PRIMARY KEY (pizza_type_id, sauce_id)
    )",
    "CREATE TABLE IF NOT EXISTS beverage (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        address_id UUID NOT NULL REFERENCES address (id),
        order_status order_status NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS pizza (
        id UUID PRIMARY KEY,
        order_id UUID REFERENCES orders (id) ON DELETE CASCADE,
        pizza_type_id UUID REFERENCES pizza_type (id)
    )",
    // Composite primary key keeps one row per (order, beverage) pair
    "CREATE TABLE IF NOT EXISTS order_beverage_quantity (
        order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        beverage_id UUID NOT NULL REFERENCES beverage (id),
        quantity INTEGER NOT NULL,
        PRIMARY KEY (order_id, beverage_id)
    )",
];

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Connection and bootstrap themselves need a live Postgres and are
    // covered by integration runs; this only guards the DDL set.
    #[test]
    fn test_schema_covers_all_tables() {
        let tables = [
            "address",
            "dough",
            "sauce",
            "pizza_type",
            "pizza_type_sauce",
            "beverage",
            "orders",
            "pizza",
            "order_beverage_quantity",
        ];

        for table in tables {
            assert!(
                SCHEMA_DDL
                    .iter()
                    .any(|ddl| ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {table} ("))),
                "missing DDL for table {table}"
            );
        }
    }

    #[test]
    fn test_children_cascade_on_order_delete() {
        let child_tables = ["pizza", "order_beverage_quantity"];

        for table in child_tables {
            let ddl = SCHEMA_DDL
                .iter()
                .find(|ddl| ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")))
                .unwrap();
            assert!(
                ddl.contains("REFERENCES orders (id) ON DELETE CASCADE"),
                "{table} must cascade on order delete"
            );
        }
    }
}
