use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Order, OrderBeverageKey, OrderBeverageQuantity, OrderStatus, Pizza, PizzaType,
};
use crate::schemas::{BeverageQuantityCreateSchema, JoinedPizzaRow, OrderCreateSchema};
use crate::service::address;

// ============================================================================
// Order Operations
// ============================================================================
//
// Lifecycle of an order and its pizza / beverage lines. Every operation runs
// against the shared pool in its own implicit transaction; not-found is
// logged and reported as None/false, store failures propagate.
//
// ============================================================================

const ORDER_COLUMNS: &str = "id, user_id, address_id, order_status, created_at";

/// Create the delivery address and the order referencing it, with status
/// `Transmitted`.
///
/// The two inserts are deliberately not wrapped in one transaction: if the
/// order insert fails the address row stays behind.
pub async fn create_order(pool: &PgPool, schema: &OrderCreateSchema) -> Result<Order> {
    let address = address::create_address(pool, &schema.address).await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, user_id, address_id, order_status)
         VALUES ($1, $2, $3, $4)
         RETURNING id, user_id, address_id, order_status, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(schema.user_id)
    .bind(address.id)
    .bind(OrderStatus::Transmitted)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %order.user_id,
        status = ?order.order_status,
        "Order created"
    );

    Ok(order)
}

/// Look up an order by primary key. Not-found is logged, not raised.
pub async fn get_order_by_id(pool: &PgPool, order_id: Uuid) -> Result<Option<Order>> {
    let entity =
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id)
            .fetch_optional(pool)
            .await?;

    if entity.is_none() {
        tracing::error!(order_id = %order_id, "Order not found");
    }

    Ok(entity)
}

/// All orders, optionally filtered by status equality.
pub async fn get_all_orders(pool: &PgPool, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let orders = match status {
        Some(status) => {
            sqlx::query_as::<_, Order>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE order_status = $1"
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders"))
                .fetch_all(pool)
                .await?
        }
    };

    Ok(orders)
}

/// Delete an order if it exists; a missing id is a logged no-op. Pizza and
/// beverage rows go with it via the store's cascade.
pub async fn delete_order_by_id(pool: &PgPool, order_id: Uuid) -> Result<()> {
    match get_order_by_id(pool, order_id).await? {
        Some(order) => {
            sqlx::query("DELETE FROM orders WHERE id = $1")
                .bind(order.id)
                .execute(pool)
                .await?;
            tracing::info!(order_id = %order_id, "Order deleted");
        }
        None => {
            tracing::error!(order_id = %order_id, "Failed to delete order: not found");
        }
    }

    Ok(())
}

/// Overwrite the status of an already-loaded order and return the refreshed
/// row. Any status may follow any other; there is no transition table.
pub async fn update_order_status(
    pool: &PgPool,
    order: &Order,
    new_status: OrderStatus,
) -> Result<Order> {
    let updated = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET order_status = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(new_status)
    .bind(order.id)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        order_id = %updated.id,
        status = ?updated.order_status,
        "Order status updated"
    );

    Ok(updated)
}

/// Create a bare pizza row, not yet attached to any order. A missing type
/// leaves the reference unset.
pub async fn create_pizza(pool: &PgPool, pizza_type: Option<&PizzaType>) -> Result<Pizza> {
    let pizza = sqlx::query_as::<_, Pizza>(
        "INSERT INTO pizza (id, pizza_type_id) VALUES ($1, $2)
         RETURNING id, order_id, pizza_type_id",
    )
    .bind(Uuid::new_v4())
    .bind(pizza_type.map(|t| t.id))
    .fetch_one(pool)
    .await?;

    tracing::info!(
        pizza_id = %pizza.id,
        pizza_type_id = ?pizza.pizza_type_id,
        "Pizza created"
    );

    Ok(pizza)
}

/// Create a pizza of the given type and attach it to the order.
pub async fn add_pizza_to_order(
    pool: &PgPool,
    order: &Order,
    pizza_type: &PizzaType,
) -> Result<Pizza> {
    let pizza = create_pizza(pool, Some(pizza_type)).await?;

    let pizza = sqlx::query_as::<_, Pizza>(
        "UPDATE pizza SET order_id = $1 WHERE id = $2
         RETURNING id, order_id, pizza_type_id",
    )
    .bind(order.id)
    .bind(pizza.id)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        pizza_id = %pizza.id,
        order_id = %order.id,
        "Pizza added to order"
    );

    Ok(pizza)
}

/// Look up a pizza by primary key. Not-found is logged, not raised.
pub async fn get_pizza_by_id(pool: &PgPool, pizza_id: Uuid) -> Result<Option<Pizza>> {
    let entity = sqlx::query_as::<_, Pizza>(
        "SELECT id, order_id, pizza_type_id FROM pizza WHERE id = $1",
    )
    .bind(pizza_id)
    .fetch_optional(pool)
    .await?;

    if entity.is_none() {
        tracing::error!(pizza_id = %pizza_id, "Pizza not found");
    }

    Ok(entity)
}

/// Flattened pizza/type rows for one order.
pub async fn get_all_pizzas_of_order(pool: &PgPool, order: &Order) -> Result<Vec<JoinedPizzaRow>> {
    let rows = sqlx::query_as::<_, JoinedPizzaRow>(
        "SELECT p.id, pt.name, pt.price, pt.description, pt.dough_id
         FROM pizza p
         JOIN pizza_type pt ON pt.id = p.pizza_type_id
         WHERE p.order_id = $1",
    )
    .bind(order.id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete a pizza only if it belongs to the given order. Returns whether a
/// row was deleted; a pizza on a different order is left untouched.
pub async fn delete_pizza_from_order(
    pool: &PgPool,
    order: &Order,
    pizza_id: Uuid,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM pizza WHERE id = $1 AND order_id = $2")
        .bind(pizza_id)
        .bind(order.id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!(pizza_id = %pizza_id, order_id = %order.id, "Pizza deleted from order");
        Ok(true)
    } else {
        tracing::error!(
            pizza_id = %pizza_id,
            order_id = %order.id,
            "Failed to delete pizza from order: not found"
        );
        Ok(false)
    }
}

/// Insert a beverage line for the order from the request schema.
pub async fn create_beverage_quantity(
    pool: &PgPool,
    order: &Order,
    schema: &BeverageQuantityCreateSchema,
) -> Result<OrderBeverageQuantity> {
    let entity = sqlx::query_as::<_, OrderBeverageQuantity>(
        "INSERT INTO order_beverage_quantity (order_id, beverage_id, quantity)
         VALUES ($1, $2, $3)
         RETURNING order_id, beverage_id, quantity",
    )
    .bind(order.id)
    .bind(schema.beverage_id)
    .bind(schema.quantity)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        order_id = %order.id,
        beverage_id = %entity.beverage_id,
        quantity = entity.quantity,
        "Beverage quantity created"
    );

    Ok(entity)
}

/// Composite-key lookup of one beverage line. Not-found is logged.
pub async fn get_beverage_quantity_by_id(
    pool: &PgPool,
    key: OrderBeverageKey,
) -> Result<Option<OrderBeverageQuantity>> {
    let entity = sqlx::query_as::<_, OrderBeverageQuantity>(
        "SELECT order_id, beverage_id, quantity
         FROM order_beverage_quantity
         WHERE order_id = $1 AND beverage_id = $2",
    )
    .bind(key.order_id)
    .bind(key.beverage_id)
    .fetch_optional(pool)
    .await?;

    if entity.is_none() {
        tracing::error!(
            order_id = %key.order_id,
            beverage_id = %key.beverage_id,
            "Beverage quantity not found"
        );
    }

    Ok(entity)
}

/// All beverage lines of one order.
pub async fn get_joined_beverage_quantities_by_order(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Vec<OrderBeverageQuantity>> {
    let rows = sqlx::query_as::<_, OrderBeverageQuantity>(
        "SELECT order_id, beverage_id, quantity
         FROM order_beverage_quantity
         WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Overwrite the quantity of an existing beverage line and return the
/// refreshed row. A missing line is logged and nothing is mutated.
pub async fn update_beverage_quantity_of_order(
    pool: &PgPool,
    key: OrderBeverageKey,
    new_quantity: i32,
) -> Result<Option<OrderBeverageQuantity>> {
    let updated = sqlx::query_as::<_, OrderBeverageQuantity>(
        "UPDATE order_beverage_quantity SET quantity = $1
         WHERE order_id = $2 AND beverage_id = $3
         RETURNING order_id, beverage_id, quantity",
    )
    .bind(new_quantity)
    .bind(key.order_id)
    .bind(key.beverage_id)
    .fetch_optional(pool)
    .await?;

    match &updated {
        Some(entity) => tracing::info!(
            order_id = %entity.order_id,
            beverage_id = %entity.beverage_id,
            quantity = entity.quantity,
            "Beverage quantity updated"
        ),
        None => tracing::error!(
            order_id = %key.order_id,
            beverage_id = %key.beverage_id,
            "Beverage quantity not found"
        ),
    }

    Ok(updated)
}

/// Delete one beverage line. Returns whether a row was deleted.
pub async fn delete_beverage_from_order(pool: &PgPool, key: OrderBeverageKey) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM order_beverage_quantity WHERE order_id = $1 AND beverage_id = $2",
    )
    .bind(key.order_id)
    .bind(key.beverage_id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(
            order_id = %key.order_id,
            beverage_id = %key.beverage_id,
            "Beverage deleted from order"
        );
        Ok(true)
    } else {
        tracing::error!(
            order_id = %key.order_id,
            beverage_id = %key.beverage_id,
            "Failed to delete beverage from order: not found"
        );
        Ok(false)
    }
}

// ============================================================================
// Price Aggregation
// ============================================================================

/// Total price of an order: beverage prices times their quantities, plus
/// the type price of every pizza row (a pizza has no per-row quantity).
pub async fn get_price_of_order(pool: &PgPool, order_id: Uuid) -> Result<f64> {
    let beverage_rows: Vec<(f64, i32)> = sqlx::query_as(
        "SELECT b.price, obq.quantity
         FROM order_beverage_quantity obq
         JOIN beverage b ON b.id = obq.beverage_id
         WHERE obq.order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    // SUM over zero pizza rows yields NULL, not 0
    let pizza_total: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(pt.price)
         FROM pizza p
         JOIN pizza_type pt ON pt.id = p.pizza_type_id
         WHERE p.order_id = $1",
    )
    .bind(order_id)
    .fetch_one(pool)
    .await?;

    let total = combine_price(pizza_total, beverage_total(&beverage_rows));
    tracing::info!(order_id = %order_id, total, "Calculated order price");

    Ok(total)
}

/// Fold (price, quantity) beverage rows into a sum.
fn beverage_total(rows: &[(f64, i32)]) -> f64 {
    rows.iter()
        .map(|(price, quantity)| price * f64::from(*quantity))
        .sum()
}

/// Combine the pizza aggregate with the beverage sum. An absent pizza
/// aggregate means the order has no pizzas and the beverage sum stands
/// alone.
fn combine_price(pizza_total: Option<f64>, beverage_total: f64) -> f64 {
    match pizza_total {
        Some(pizza_total) => pizza_total + beverage_total,
        None => beverage_total,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // The store-touching operations (create/lookup/delete against Postgres)
    // need a live database and are exercised by integration runs; the price
    // arithmetic is covered here.

    #[test]
    fn test_beverage_total_multiplies_by_quantity() {
        // 2.50 x 3 + 1.00 x 2
        let rows = vec![(2.50, 3), (1.00, 2)];
        assert_eq!(beverage_total(&rows), 9.50);
    }

    #[test]
    fn test_beverage_total_of_no_rows_is_zero() {
        assert_eq!(beverage_total(&[]), 0.0);
    }

    #[test]
    fn test_price_without_pizzas_is_beverage_sum_alone() {
        let rows = vec![(2.50, 3), (1.00, 2)];
        assert_eq!(combine_price(None, beverage_total(&rows)), 9.50);
    }

    #[test]
    fn test_price_sums_every_pizza_row() {
        // Two pizzas priced 8.00 and 10.00, no beverages; rows are summed,
        // never averaged or deduplicated by type
        assert_eq!(combine_price(Some(8.00 + 10.00), beverage_total(&[])), 18.00);
    }

    #[test]
    fn test_price_of_margherita_and_two_colas() {
        // One Margherita at 8.00 plus 2 x Cola at 1.50
        let beverages = vec![(1.50, 2)];
        assert_eq!(combine_price(Some(8.00), beverage_total(&beverages)), 11.00);
    }

    #[test]
    fn test_zero_quantity_beverage_contributes_nothing() {
        let rows = vec![(2.50, 0)];
        assert_eq!(beverage_total(&rows), 0.0);
    }
}
