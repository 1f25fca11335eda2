use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::PizzaType;

// ============================================================================
// Request / Response Schemas
//
// Plain attribute bundles mirroring the web layer's wire contract. The web
// layer validates and deserializes these before calling into the service.
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AddressCreateSchema {
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub town: String,
    pub country: String,
    pub first_name: String,
    pub last_name: String,
}

/// Order creation request: the owning user plus the delivery address to
/// create alongside the order. Pizza and beverage lists start empty.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreateSchema {
    pub user_id: Uuid,
    pub address: AddressCreateSchema,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BeverageQuantityCreateSchema {
    pub beverage_id: Uuid,
    pub quantity: i32,
}

/// Catalog read shape for a pizza type.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PizzaTypeSchema {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
}

impl From<&PizzaType> for PizzaTypeSchema {
    fn from(pizza_type: &PizzaType) -> Self {
        Self {
            id: pizza_type.id,
            name: pizza_type.name.clone(),
            price: pizza_type.price,
            description: pizza_type.description.clone(),
        }
    }
}

/// Flattened Pizza ⋈ PizzaType row returned by `get_all_pizzas_of_order`.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct JoinedPizzaRow {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub dough_id: Uuid,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_create_schema_from_request_body() {
        let body = r#"{
            "user_id": "4a3f0b1e-9a44-4d7e-8b6a-2f1c5d9e0a11",
            "address": {
                "street": "Hauptstrasse",
                "house_number": "12a",
                "postal_code": "76131",
                "town": "Karlsruhe",
                "country": "Germany",
                "first_name": "Ada",
                "last_name": "Lovelace"
            }
        }"#;

        let schema: OrderCreateSchema = serde_json::from_str(body).unwrap();
        assert_eq!(
            schema.user_id.to_string(),
            "4a3f0b1e-9a44-4d7e-8b6a-2f1c5d9e0a11"
        );
        assert_eq!(schema.address.town, "Karlsruhe");
        assert_eq!(schema.address.house_number, "12a");
    }

    #[test]
    fn test_beverage_quantity_create_schema() {
        let body = r#"{"beverage_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7", "quantity": 2}"#;
        let schema: BeverageQuantityCreateSchema = serde_json::from_str(body).unwrap();
        assert_eq!(schema.quantity, 2);
    }

    #[test]
    fn test_pizza_type_schema_drops_dough_reference() {
        let pizza_type = PizzaType {
            id: Uuid::new_v4(),
            name: "Margherita".to_string(),
            price: 8.0,
            description: "Tomato and mozzarella".to_string(),
            dough_id: Uuid::new_v4(),
        };

        let schema = PizzaTypeSchema::from(&pizza_type);
        assert_eq!(schema.name, "Margherita");

        let json = serde_json::to_value(&schema).unwrap();
        assert!(json.get("dough_id").is_none());
    }
}
