//! Domain records and their DTOs.

pub mod address;
pub mod coupon;
pub mod money;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod review;
pub mod user;

pub use address::*;
pub use coupon::*;
pub use money::{DeliveryPolicy, MAX_PRICE, MAX_QUANTITY};
pub use order::*;
pub use product::*;
pub use restaurant::*;
pub use review::*;
pub use user::*;
