//! Typed clients, one per actor. Each wraps a `ResourceClient<T>` and turns
//! framework errors back into the actor's own error type.

pub mod coupon_client;
pub mod order_client;
pub mod product_client;
pub mod restaurant_client;
pub mod review_client;
pub mod user_client;

pub use coupon_client::CouponClient;
pub use order_client::OrderClient;
pub use product_client::ProductClient;
pub use restaurant_client::RestaurantClient;
pub use review_client::ReviewClient;
pub use user_client::UserClient;
