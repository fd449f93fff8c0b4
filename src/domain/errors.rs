use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Cart not found")]
    CartNotFound,
    #[error("Cart item not found")]
    CartItemNotFound,
    #[error("Internal error: {0}")]
    Internal(String),
}
