use uuid::Uuid;

use super::cart::{CartItem, CartLookup, ItemChange};
use super::errors::DomainError;

/// Persistence port for carts and their line items.
///
/// Every method takes the session-derived cart key explicitly. Mutations must
/// be atomic per call: an implementation may not interleave two calls for the
/// same (cart, product) pair.
pub trait CartRepository: Send + Sync + 'static {
    /// Active lines of the cart stored under `cart_key`, joined with their
    /// product's name and price.
    fn find_active_lines(&self, cart_key: &str) -> Result<CartLookup, DomainError>;

    /// Get-or-create the cart, then get-or-create the line for `product_id`:
    /// a new line starts at quantity 1, an existing one is incremented.
    fn add_item(&self, cart_key: &str, product_id: Uuid) -> Result<CartItem, DomainError>;

    /// Decrement the line's quantity, deleting it when it would reach zero.
    fn decrement_item(&self, cart_key: &str, product_id: Uuid)
        -> Result<ItemChange, DomainError>;

    /// Delete the line regardless of its quantity.
    fn remove_item(&self, cart_key: &str, product_id: Uuid) -> Result<(), DomainError>;
}
