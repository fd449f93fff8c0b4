//! In-memory `CartRepository` for unit tests that should not need Postgres.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::cart::{CartItem, CartLine, CartLookup, ItemChange};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

struct StoredProduct {
    name: String,
    price: BigDecimal,
}

#[derive(Default)]
struct State {
    products: HashMap<Uuid, StoredProduct>,
    carts: HashMap<String, Uuid>,
    // Insertion order doubles as line order.
    items: Vec<CartItem>,
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    state: Mutex<State>,
}

impl InMemoryCartRepository {
    pub fn with_product(&self, name: &str, price: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().products.insert(
            id,
            StoredProduct {
                name: name.to_string(),
                price: BigDecimal::from_str(price).expect("valid decimal"),
            },
        );
        id
    }

    pub fn has_cart(&self, cart_key: &str) -> bool {
        self.state.lock().unwrap().carts.contains_key(cart_key)
    }

    pub fn items_for(&self, cart_key: &str) -> Vec<CartItem> {
        let state = self.state.lock().unwrap();
        let Some(cart_id) = state.carts.get(cart_key) else {
            return vec![];
        };
        state
            .items
            .iter()
            .filter(|i| i.cart_id == *cart_id)
            .cloned()
            .collect()
    }

    pub fn set_active(&self, cart_key: &str, product_id: Uuid, active: bool) {
        let mut state = self.state.lock().unwrap();
        let cart_id = state.carts[cart_key];
        for item in state
            .items
            .iter_mut()
            .filter(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            item.is_active = active;
        }
    }
}

fn locate(state: &State, cart_key: &str, product_id: Uuid) -> Result<usize, DomainError> {
    let cart_id = *state
        .carts
        .get(cart_key)
        .ok_or(DomainError::CartNotFound)?;
    if !state.products.contains_key(&product_id) {
        return Err(DomainError::ProductNotFound);
    }
    state
        .items
        .iter()
        .position(|i| i.cart_id == cart_id && i.product_id == product_id)
        .ok_or(DomainError::CartItemNotFound)
}

impl CartRepository for InMemoryCartRepository {
    fn find_active_lines(&self, cart_key: &str) -> Result<CartLookup, DomainError> {
        let state = self.state.lock().unwrap();
        let Some(cart_id) = state.carts.get(cart_key) else {
            return Ok(CartLookup::NotFound);
        };
        let lines = state
            .items
            .iter()
            .filter(|i| i.cart_id == *cart_id && i.is_active)
            .map(|i| {
                let product = &state.products[&i.product_id];
                CartLine {
                    product_id: i.product_id,
                    product_name: product.name.clone(),
                    unit_price: product.price.clone(),
                    quantity: i.quantity,
                }
            })
            .collect();
        Ok(CartLookup::Found(lines))
    }

    fn add_item(&self, cart_key: &str, product_id: Uuid) -> Result<CartItem, DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.products.contains_key(&product_id) {
            return Err(DomainError::ProductNotFound);
        }
        let cart_id = *state
            .carts
            .entry(cart_key.to_string())
            .or_insert_with(Uuid::new_v4);

        if let Some(item) = state
            .items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            item.quantity += 1;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: Uuid::new_v4(),
            cart_id,
            product_id,
            quantity: 1,
            is_active: true,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    fn decrement_item(
        &self,
        cart_key: &str,
        product_id: Uuid,
    ) -> Result<ItemChange, DomainError> {
        let mut state = self.state.lock().unwrap();
        let idx = locate(&state, cart_key, product_id)?;
        let item = &mut state.items[idx];
        if item.quantity > 1 {
            item.quantity -= 1;
            Ok(ItemChange::Decremented {
                remaining: item.quantity,
            })
        } else {
            state.items.remove(idx);
            Ok(ItemChange::Removed)
        }
    }

    fn remove_item(&self, cart_key: &str, product_id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let idx = locate(&state, cart_key, product_id)?;
        state.items.remove(idx);
        Ok(())
    }
}
