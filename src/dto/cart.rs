use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Cart, DiningTable, MenuItem, Restaurant};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    /// Falls back to the caller's current table when omitted.
    pub table_token: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// Payload for the AJAX-style cart mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub success: bool,
    #[schema(value_type = Option<f64>)]
    pub item_subtotal: Option<Decimal>,
    #[schema(value_type = f64)]
    pub cart_total: Decimal,
    pub items_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub menu_item: MenuItem,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub restaurant: Restaurant,
    pub table: DiningTable,
    pub cart: Option<Cart>,
    pub items: Vec<CartLine>,
    #[schema(value_type = f64)]
    pub cart_total: Decimal,
    pub items_count: i64,
}
