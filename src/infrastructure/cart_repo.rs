use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{CartItem, CartLine, CartLookup, ItemChange};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, carts, products};

use super::models::{CartItemRow, CartRow, NewCartItemRow, NewCartRow, ProductRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Lookups shared by the mutations ───────────────────────────────────────────

fn find_cart(conn: &mut PgConnection, cart_key: &str) -> QueryResult<Option<CartRow>> {
    carts::table
        .filter(carts::cart_key.eq(cart_key))
        .select(CartRow::as_select())
        .first(conn)
        .optional()
}

fn product_exists(conn: &mut PgConnection, product_id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        products::table.filter(products::id.eq(product_id)),
    ))
    .get_result(conn)
}

/// Resolve cart, product and line in that order, locking the line row for the
/// rest of the transaction.
fn lock_item(
    conn: &mut PgConnection,
    cart_key: &str,
    product_id: Uuid,
) -> Result<CartItemRow, DomainError> {
    let cart = find_cart(conn, cart_key)?.ok_or(DomainError::CartNotFound)?;

    if !product_exists(conn, product_id)? {
        return Err(DomainError::ProductNotFound);
    }

    cart_items::table
        .filter(cart_items::cart_id.eq(cart.id))
        .filter(cart_items::product_id.eq(product_id))
        .select(CartItemRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::CartItemNotFound)
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn find_active_lines(&self, cart_key: &str) -> Result<CartLookup, DomainError> {
        let mut conn = self.pool.get()?;

        let Some(cart) = find_cart(&mut conn, cart_key)? else {
            return Ok(CartLookup::NotFound);
        };

        let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::cart_id.eq(cart.id))
            .filter(cart_items::is_active.eq(true))
            .order(cart_items::created_at.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)?;

        Ok(CartLookup::Found(
            rows.into_iter()
                .map(|(item, product)| CartLine {
                    product_id: product.id,
                    product_name: product.name,
                    unit_price: product.price,
                    quantity: item.quantity,
                })
                .collect(),
        ))
    }

    fn add_item(&self, cart_key: &str, product_id: Uuid) -> Result<CartItem, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. The product must exist before anything is written.
            if !product_exists(conn, product_id)? {
                return Err(DomainError::ProductNotFound);
            }

            // 2. Get-or-create the cart. A concurrent insert for the same key
            //    lands on the unique constraint and is ignored.
            diesel::insert_into(carts::table)
                .values(&NewCartRow {
                    id: Uuid::new_v4(),
                    cart_key,
                })
                .on_conflict(carts::cart_key)
                .do_nothing()
                .execute(conn)?;
            let cart = find_cart(conn, cart_key)?.ok_or_else(|| {
                DomainError::Internal(format!("cart '{}' vanished after upsert", cart_key))
            })?;

            // 3. Get-or-create the line. The existing row wins; only its
            //    quantity changes.
            let item = diesel::insert_into(cart_items::table)
                .values(&NewCartItemRow {
                    id: Uuid::new_v4(),
                    cart_id: cart.id,
                    product_id,
                    quantity: 1,
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set((
                    cart_items::quantity.eq(cart_items::quantity + 1),
                    cart_items::updated_at.eq(Utc::now()),
                ))
                .returning(CartItemRow::as_returning())
                .get_result(conn)?;

            Ok(item.into())
        })
    }

    fn decrement_item(
        &self,
        cart_key: &str,
        product_id: Uuid,
    ) -> Result<ItemChange, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let item = lock_item(conn, cart_key, product_id)?;

            if item.quantity > 1 {
                let remaining: i32 = diesel::update(cart_items::table.find(item.id))
                    .set((
                        cart_items::quantity.eq(cart_items::quantity - 1),
                        cart_items::updated_at.eq(Utc::now()),
                    ))
                    .returning(cart_items::quantity)
                    .get_result(conn)?;
                Ok(ItemChange::Decremented { remaining })
            } else {
                diesel::delete(cart_items::table.find(item.id)).execute(conn)?;
                Ok(ItemChange::Removed)
            }
        })
    }

    fn remove_item(&self, cart_key: &str, product_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let item = lock_item(conn, cart_key, product_id)?;
            diesel::delete(cart_items::table.find(item.id)).execute(conn)?;
            Ok(())
        })
    }
}
