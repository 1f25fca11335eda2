use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Domain Models
// ============================================================================

/// Fulfillment state of an order.
///
/// Set to `Transmitted` when the order is created and overwritten freely by
/// `update_order_status`; no transition table is enforced.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Transmitted,
    Preparing,
    InDelivery,
    Delivered,
}

#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Delivery address, created alongside its order. Exactly one per order.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Address {
    pub id: Uuid,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub town: String,
    pub country: String,
    pub first_name: String,
    pub last_name: String,
}

/// A single pizza on an order. `order_id` is unset between `create_pizza`
/// and attachment; `pizza_type_id` is unset for a typeless pizza.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Pizza {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub pizza_type_id: Option<Uuid>,
}

/// Catalog definition of a pizza. Read-only from this service; the catalog
/// module that writes these lives elsewhere.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct PizzaType {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub dough_id: Uuid,
}

/// Catalog beverage. Read-only here.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Beverage {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
}

/// Join row recording how many of a beverage were ordered on an order.
/// One row per (order, beverage) pair.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct OrderBeverageQuantity {
    pub order_id: Uuid,
    pub beverage_id: Uuid,
    pub quantity: i32,
}

/// Value-equality key identifying one beverage line of one order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrderBeverageKey {
    pub order_id: Uuid,
    pub beverage_id: Uuid,
}

impl OrderBeverageKey {
    pub fn new(order_id: Uuid, beverage_id: Uuid) -> Self {
        Self { order_id, beverage_id }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        let json = serde_json::to_string(&OrderStatus::InDelivery).unwrap();
        assert_eq!(json, "\"IN_DELIVERY\"");

        let status: OrderStatus = serde_json::from_str("\"TRANSMITTED\"").unwrap();
        assert_eq!(status, OrderStatus::Transmitted);
    }

    #[test]
    fn test_beverage_key_equality() {
        let order_id = Uuid::new_v4();
        let beverage_id = Uuid::new_v4();

        let key = OrderBeverageKey::new(order_id, beverage_id);
        assert_eq!(key, OrderBeverageKey::new(order_id, beverage_id));

        // Same beverage on another order is a different line
        assert_ne!(key, OrderBeverageKey::new(Uuid::new_v4(), beverage_id));
        assert_ne!(key, OrderBeverageKey::new(order_id, Uuid::new_v4()));
    }

    #[test]
    fn test_beverage_key_usable_as_map_key() {
        use std::collections::HashMap;

        let key = OrderBeverageKey::new(Uuid::new_v4(), Uuid::new_v4());
        let mut quantities: HashMap<OrderBeverageKey, i32> = HashMap::new();
        quantities.insert(key, 2);

        assert_eq!(quantities.get(&key), Some(&2));
    }
}
