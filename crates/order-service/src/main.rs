//! Demo: one order from placement to delivery, its receipt, then a review.

use actor_framework::tracing::setup_tracing;
use actor_framework::ActorClient;
use order_service::clock::SystemClock;
use order_service::config::OrderConfig;
use order_service::geocoding::{Geocoder, RateLimitedGeocoder, RateLimiter, StaticGeocoder};
use order_service::lifecycle::OrderSystem;
use order_service::model::{
    CouponCode, CouponCreate, DeliveryAddress, DiscountRule, PaymentMethod, PaymentOutcome,
    ProductCreate, RestaurantCreate, RestaurantId, ReviewCreate, UserCreate,
};
use order_service::request::PlaceOrderRequest;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = OrderConfig::from_env();
    let limiter = Arc::new(RateLimiter::new(config.geocode_min_interval));
    let geocoder: Arc<dyn Geocoder> = Arc::new(RateLimitedGeocoder::new(
        StaticGeocoder::new()
            .with_place("Kathmandu", 27.7172, 85.3240)
            .with_place("Thamel", 27.7154, 85.3123),
        limiter,
    ));
    let system = OrderSystem::with_dependencies(config, Arc::new(SystemClock), Some(geocoder));

    let customer = system
        .user_client
        .create_user(UserCreate {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;
    let owner = system
        .user_client
        .create_user(UserCreate {
            name: "Bikash".to_string(),
            email: "bikash@example.com".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;

    // Approving a restaurant that has no record yet creates it.
    let restaurant = system
        .restaurant_client
        .approve(
            RestaurantId(1),
            RestaurantCreate {
                owner,
                name: "Himalayan Momo House".to_string(),
                address: "Thamel, Kathmandu".to_string(),
                phone: None,
                cuisine: vec!["Nepali".to_string()],
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    info!(restaurant_id = %restaurant.id, "Restaurant approved");

    let momo = system
        .product_client
        .create_product(ProductCreate::new(restaurant.id, "Chicken Momo", Decimal::from(100), 40))
        .await
        .map_err(|e| e.to_string())?;
    let tea = system
        .product_client
        .create_product(ProductCreate::new(restaurant.id, "Masala Tea", Decimal::from(50), 100))
        .await
        .map_err(|e| e.to_string())?;

    system
        .coupon_client
        .create_coupon(
            CouponCode::new("10PERCENT"),
            CouponCreate::unrestricted(DiscountRule::Percentage(Decimal::from(10))),
        )
        .await
        .map_err(|e| e.to_string())?;

    let body = format!(
        r#"{{
            "userId": {customer},
            "restaurantId": {restaurant},
            "items": [{{"productId": {momo}, "qty": 2}}, {{"productId": {tea}, "qty": "1"}}],
            "deliveryAddress": {{"street": "Chaksibari Marg", "area": "Thamel", "city": "Kathmandu"}},
            "couponCode": "10percent",
            "paymentMethod": "esewa"
        }}"#,
        customer = customer.0,
        restaurant = restaurant.id.0,
        momo = momo.0,
        tea = tea.0,
    );
    let params = PlaceOrderRequest::from_json(&body)
        .and_then(PlaceOrderRequest::validate)
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("order_processing");
    let result = async {
        let orders = &system.order_client;
        let id = orders.place_order(params).await?;
        orders.accept_order(id, 25).await?;
        orders.advance_kitchen(id).await?;
        orders
            .record_payment(id, PaymentMethod::Esewa, Some("ES-20261019-0001".into()), PaymentOutcome::Completed)
            .await?;
        orders.advance_kitchen(id).await?;
        orders.dispatch_order(id).await?;
        orders.confirm_delivery(id).await?;
        system.get_receipt(id).await
    }
    .instrument(span)
    .await;

    match result {
        Ok(receipt) => println!("{receipt}"),
        Err(e) => error!(error = %e, kind = ?e.kind(), "Order processing failed"),
    }

    system
        .review_client
        .post_review(ReviewCreate {
            user_id: customer,
            restaurant_id: restaurant.id,
            product_id: Some(momo),
            rating: 5,
            comment: "Juicy momo, still hot on arrival.".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;
    if let Some(rated) = system
        .restaurant_client
        .get(restaurant.id)
        .await
        .map_err(|e| e.to_string())?
    {
        info!(
            restaurant_id = %rated.id,
            rating = %rated.rating.average(),
            total_reviews = rated.rating.total_reviews,
            "Restaurant rated"
        );
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
