use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cart::{summarize, CartItem, CartView, ItemChange};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

#[derive(Clone)]
pub struct CartService {
    repo: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>) -> Self {
        Self { repo }
    }

    pub fn view_cart(&self, cart_key: &str) -> Result<CartView, DomainError> {
        let lookup = self.repo.find_active_lines(cart_key)?;
        Ok(summarize(lookup))
    }

    /// Number of units across the active lines; zero when there is no cart.
    pub fn count_items(&self, cart_key: &str) -> Result<i64, DomainError> {
        self.view_cart(cart_key).map(|view| view.quantity)
    }

    pub fn add_item(&self, cart_key: &str, product_id: Uuid) -> Result<CartItem, DomainError> {
        let item = self
            .repo
            .add_item(cart_key, product_id)
            .inspect_err(|e| log_failure("add", cart_key, product_id, e))?;
        log::info!(
            "cart {}: product {} quantity now {}",
            cart_key,
            product_id,
            item.quantity
        );
        Ok(item)
    }

    pub fn decrement_or_remove(
        &self,
        cart_key: &str,
        product_id: Uuid,
    ) -> Result<ItemChange, DomainError> {
        let change = self
            .repo
            .decrement_item(cart_key, product_id)
            .inspect_err(|e| log_failure("decrement", cart_key, product_id, e))?;
        match change {
            ItemChange::Decremented { remaining } => log::info!(
                "cart {}: product {} quantity now {}",
                cart_key,
                product_id,
                remaining
            ),
            ItemChange::Removed => {
                log::info!("cart {}: product {} removed", cart_key, product_id)
            }
        }
        Ok(change)
    }

    pub fn remove_item(&self, cart_key: &str, product_id: Uuid) -> Result<(), DomainError> {
        self.repo
            .remove_item(cart_key, product_id)
            .inspect_err(|e| log_failure("remove", cart_key, product_id, e))?;
        log::info!("cart {}: product {} removed", cart_key, product_id);
        Ok(())
    }
}

fn log_failure(op: &str, cart_key: &str, product_id: Uuid, e: &DomainError) {
    match e {
        DomainError::Internal(_) => log::error!(
            "cart {}: {} of product {} failed: {}",
            cart_key,
            op,
            product_id,
            e
        ),
        _ => log::warn!(
            "cart {}: {} of product {} rejected: {}",
            cart_key,
            op,
            product_id,
            e
        ),
    }
}
