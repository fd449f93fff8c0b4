use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::schema::{cart_items, carts, products};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Products are owned by the catalog; this is only used to seed test data.
#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub cart_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow<'a> {
    pub id: Uuid,
    pub cart_key: &'a str,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = cart_items)]
#[diesel(belongs_to(CartRow, foreign_key = cart_id))]
#[diesel(belongs_to(ProductRow, foreign_key = product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            is_active: row.is_active,
        }
    }
}
