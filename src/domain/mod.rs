//! Domain model: aggregates and the events they raise.

pub mod cart;
pub mod events;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartError, CartItem};
pub use order::{
    DeliveryStatus, InvalidTransition, Order, OrderItem, PaymentMethod, ShippingAddress,
};
pub use product::Product;
pub use user::{Role, User};
