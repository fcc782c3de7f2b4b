//! Application services: the cart contract and the order lifecycle manager.

pub mod carts;
pub mod orders;

pub use carts::CartService;
pub use orders::{CreateOrder, CustomerRef, OrderService, OrderView};
