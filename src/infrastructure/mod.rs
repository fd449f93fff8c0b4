pub mod cart_repo;
pub mod models;

pub use cart_repo::DieselCartRepository;
