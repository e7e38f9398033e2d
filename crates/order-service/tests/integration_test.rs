use actor_framework::ActorClient;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use order_service::clock::{Clock, ManualClock};
use order_service::config::{OrderConfig, PrepaidFailurePolicy, StockPolicy};
use order_service::coupon_actor::CouponError;
use order_service::geocoding::{AddressQuery, GeocodeError, Geocoder, StaticGeocoder};
use order_service::lifecycle::OrderSystem;
use order_service::model::{
    CartItem, CouponCode, CouponCreate, Coordinates, DeliveryAddress, DiscountRule, Initiator,
    OrderCreate, OrderStatus, PaymentMethod, PaymentOutcome, PaymentStatus, ProductCreate,
    ProductId, ProductUpdate, RestaurantCreate, RestaurantId, RestaurantStatus, UserCreate, UserId,
    ReviewCreate, MAX_PRICE, MAX_QUANTITY,
};
use order_service::order_actor::{ErrorKind, OrderError};
use order_service::product_actor::ProductError;
use order_service::review_actor::ReviewError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Notify;

/// A running system with one customer, one approved restaurant selling
/// momo (100) and tea (50), and a clock fixed at mid-2026.
struct Fixture {
    system: OrderSystem,
    clock: Arc<ManualClock>,
    customer: UserId,
    restaurant: RestaurantId,
    momo: ProductId,
    tea: ProductId,
}

async fn setup(config: OrderConfig) -> Fixture {
    setup_with_geocoder(config, None).await
}

async fn setup_with_geocoder(config: OrderConfig, geocoder: Option<Arc<dyn Geocoder>>) -> Fixture {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()));
    let system = OrderSystem::with_dependencies(config, clock.clone(), geocoder);

    let customer = system
        .user_client
        .create_user(UserCreate {
            name: "Alice".into(),
            email: "alice@example.com".into(),
        })
        .await
        .unwrap();
    let owner = system
        .user_client
        .create_user(UserCreate {
            name: "Bikash".into(),
            email: "bikash@example.com".into(),
        })
        .await
        .unwrap();
    let restaurant = system
        .restaurant_client
        .approve(RestaurantId(1), restaurant_defaults(owner, "Himalayan Momo House"))
        .await
        .unwrap()
        .id;
    let momo = system
        .product_client
        .create_product(ProductCreate::new(restaurant, "Chicken Momo", Decimal::from(100), 10))
        .await
        .unwrap();
    let tea = system
        .product_client
        .create_product(ProductCreate::new(restaurant, "Masala Tea", Decimal::from(50), 10))
        .await
        .unwrap();

    Fixture {
        system,
        clock,
        customer,
        restaurant,
        momo,
        tea,
    }
}

fn restaurant_defaults(owner: UserId, name: &str) -> RestaurantCreate {
    RestaurantCreate {
        owner,
        name: name.into(),
        address: "Thamel, Kathmandu".into(),
        phone: None,
        cuisine: vec!["Nepali".into()],
    }
}

impl Fixture {
    /// Momo ×2 + tea ×1, subtotal 250.
    fn cart(&self, coupon: Option<&str>, payment_method: PaymentMethod) -> OrderCreate {
        OrderCreate {
            user_id: self.customer,
            restaurant_id: self.restaurant,
            items: vec![
                CartItem {
                    product_id: self.momo,
                    quantity: 2,
                },
                CartItem {
                    product_id: self.tea,
                    quantity: 1,
                },
            ],
            delivery_address: DeliveryAddress::new("Chaksibari Marg", "Kathmandu").with_area("Thamel"),
            coupon_code: coupon.map(CouponCode::new),
            payment_method,
        }
    }

    async fn add_coupon(&self, code: &str, params: CouponCreate) {
        self.system
            .coupon_client
            .create_coupon(CouponCode::new(code), params)
            .await
            .unwrap();
    }

    async fn used_count(&self, code: &str) -> u32 {
        self.system
            .coupon_client
            .get(CouponCode::new(code))
            .await
            .unwrap()
            .unwrap()
            .used_count
    }
}

fn ten_percent(min_order: i64) -> CouponCreate {
    CouponCreate::unrestricted(DiscountRule::Percentage(Decimal::from(10)))
        .with_min_order(Decimal::from(min_order))
}

#[tokio::test]
async fn order_without_coupon_pays_flat_delivery() {
    let f = setup(OrderConfig::default()).await;
    let id = f.system.order_client.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    let order = f.system.order_client.get_order(id).await.unwrap();

    assert_eq!(order.subtotal, Decimal::from(250));
    assert_eq!(order.discount_amount, Decimal::ZERO);
    assert_eq!(order.delivery_charge, Decimal::from(50));
    assert_eq!(order.total, Decimal::from(300));
    assert!(order.totals_consistent());
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.restaurant_status, RestaurantStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.items[0].name, "Chicken Momo");
    assert_eq!(order.created_at, f.clock.now());

    f.system.shutdown().await.unwrap();
}

#[tokio::test]
async fn percentage_coupon_discounts_subtotal_and_counts_one_use() {
    let f = setup(OrderConfig::default()).await;
    f.add_coupon("10PERCENT", ten_percent(200)).await;

    let id = f
        .system
        .order_client
        .place_order(f.cart(Some("10percent"), PaymentMethod::Cash))
        .await
        .unwrap();
    let order = f.system.order_client.get_order(id).await.unwrap();

    assert_eq!(order.discount_amount, Decimal::from(25));
    assert_eq!(order.total, Decimal::from(275));
    assert_eq!(order.coupon_code, Some(CouponCode::new("10PERCENT")));
    assert_eq!(f.used_count("10PERCENT").await, 1);
}

#[tokio::test]
async fn coupon_below_minimum_creates_nothing() {
    let f = setup(OrderConfig::default()).await;
    f.add_coupon("10PERCENT", ten_percent(300)).await;

    let err = f
        .system
        .order_client
        .place_order(f.cart(Some("10PERCENT"), PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::Coupon(CouponError::CouponBelowMinimum { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(f.system.order_client.orders_for_user(f.customer).await.unwrap().is_empty());
    assert_eq!(f.used_count("10PERCENT").await, 0);
}

#[tokio::test]
async fn unknown_and_expired_coupons_fail_the_order() {
    let f = setup(OrderConfig::default()).await;
    let err = f
        .system
        .order_client
        .place_order(f.cart(Some("NOPE"), PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let now = f.clock.now();
    f.add_coupon(
        "MONSOON",
        ten_percent(0).valid_between(now - Duration::days(30), now + Duration::days(1)),
    )
    .await;
    f.clock.advance(Duration::days(2));

    let err = f
        .system
        .order_client
        .place_order(f.cart(Some("MONSOON"), PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Coupon(CouponError::CouponExpired(_))));
    assert_eq!(f.used_count("MONSOON").await, 0);
}

#[tokio::test]
async fn evaluating_a_coupon_does_not_use_it() {
    let f = setup(OrderConfig::default()).await;
    f.add_coupon("FLAT40", CouponCreate::unrestricted(DiscountRule::Flat(Decimal::from(40))).with_usage_cap(1))
        .await;

    let discount = f.system.evaluate_coupon("flat40", Decimal::from(250)).await.unwrap();
    assert_eq!(discount, Decimal::from(40));
    let small = f.system.evaluate_coupon("FLAT40", Decimal::from(30)).await.unwrap();
    assert_eq!(small, Decimal::from(30));
    assert_eq!(f.used_count("FLAT40").await, 0);
}

#[tokio::test]
async fn last_coupon_use_goes_to_exactly_one_order() {
    let f = setup(OrderConfig::default()).await;
    f.add_coupon("ONCE", ten_percent(0).with_usage_cap(1)).await;

    let first = f.system.order_client.clone();
    let second = f.system.order_client.clone();
    let (a, b) = tokio::join!(
        first.place_order(f.cart(Some("ONCE"), PaymentMethod::Cash)),
        second.place_order(f.cart(Some("ONCE"), PaymentMethod::Cash)),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(OrderError::Coupon(CouponError::CouponExhausted(_)))
    )));
    assert_eq!(f.used_count("ONCE").await, 1);
}

#[tokio::test]
async fn concurrent_redemptions_never_pass_the_cap() {
    let f = setup(OrderConfig::default()).await;
    f.add_coupon("FIVE", ten_percent(0).with_usage_cap(5)).await;
    let now = f.clock.now();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let coupons = f.system.coupon_client.clone();
            tokio::spawn(async move { coupons.redeem(CouponCode::new("FIVE"), Decimal::from(100), now).await })
        })
        .collect();

    let mut redeemed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(discount) => {
                assert_eq!(discount, Decimal::from(10));
                redeemed += 1;
            }
            Err(e) => assert!(matches!(e, CouponError::CouponExhausted(_))),
        }
    }
    assert_eq!(redeemed, 5);
    assert_eq!(f.used_count("FIVE").await, 5);
}

#[tokio::test]
async fn price_snapshot_survives_catalog_changes() {
    let f = setup(OrderConfig::default()).await;
    let id = f.system.order_client.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();

    f.system
        .product_client
        .update_product(
            f.momo,
            ProductUpdate {
                price: Some(Decimal::from(180)),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();

    let order = f.system.order_client.get_order(id).await.unwrap();
    assert_eq!(order.items[0].unit_price, Decimal::from(100));
    assert_eq!(order.total, Decimal::from(300));

    let receipt = f.system.get_receipt(id).await.unwrap();
    assert_eq!(receipt.lines[0].unit_price, Decimal::from(100));
    assert_eq!(receipt.total, Decimal::from(300));
}

#[tokio::test]
async fn cart_must_come_from_one_available_restaurant() {
    let f = setup(OrderConfig::default()).await;
    let other = f
        .system
        .restaurant_client
        .approve(RestaurantId(2), restaurant_defaults(f.customer, "Newa Kitchen"))
        .await
        .unwrap()
        .id;
    let bara = f
        .system
        .product_client
        .create_product(ProductCreate::new(other, "Bara", Decimal::from(80), 5))
        .await
        .unwrap();

    let mut cart = f.cart(None, PaymentMethod::Cash);
    cart.items.push(CartItem {
        product_id: bara,
        quantity: 1,
    });
    let err = f.system.order_client.place_order(cart).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::CrossRestaurantCart {
            product_id: bara,
            restaurant_id: f.restaurant
        }
    );

    f.system
        .product_client
        .update_product(
            f.tea,
            ProductUpdate {
                is_available: Some(false),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();
    let err = f
        .system
        .order_client
        .place_order(f.cart(None, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::ProductUnavailable(f.tea));

    let mut cart = f.cart(None, PaymentMethod::Cash);
    cart.items = vec![CartItem {
        product_id: ProductId(999),
        quantity: 1,
    }];
    let err = f.system.order_client.place_order(cart).await.unwrap_err();
    assert_eq!(err, OrderError::ProductNotFound(ProductId(999)));
}

#[tokio::test]
async fn unknown_customer_and_inactive_restaurant_are_rejected() {
    let f = setup(OrderConfig::default()).await;

    let mut cart = f.cart(None, PaymentMethod::Cash);
    cart.user_id = UserId(404);
    let err = f.system.order_client.place_order(cart).await.unwrap_err();
    assert_eq!(err, OrderError::UserNotFound(UserId(404)));

    f.system.restaurant_client.set_active(f.restaurant, false).await.unwrap();
    let err = f
        .system
        .order_client
        .place_order(f.cart(None, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::RestaurantUnavailable(f.restaurant));

    // Approving again reactivates without recreating the record.
    let restaurant = f
        .system
        .restaurant_client
        .approve(f.restaurant, restaurant_defaults(f.customer, "Ignored"))
        .await
        .unwrap();
    assert_eq!(restaurant.name, "Himalayan Momo House");
    assert!(restaurant.accepts_orders());
}

#[tokio::test]
async fn restaurant_rejection_cancels_the_order() {
    let f = setup(OrderConfig::default()).await;
    let id = f.system.order_client.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();

    let order = f.system.order_client.reject_order(id, "Kitchen closed").await.unwrap();
    assert_eq!(order.restaurant_status, RestaurantStatus::Rejected);
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.rejection_reason.as_deref(), Some("Kitchen closed"));

    let err = f.system.order_client.accept_order(id, 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[tokio::test]
async fn full_lifecycle_and_late_cancellation() {
    let f = setup(OrderConfig::default()).await;
    let orders = &f.system.order_client;
    let id = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();

    let first = orders.accept_order(id, 20).await.unwrap();
    let second = orders.accept_order(id, 20).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.revision, 1);

    orders.advance_kitchen(id).await.unwrap();
    orders.advance_kitchen(id).await.unwrap();
    let delivering = orders.dispatch_order(id).await.unwrap();
    assert_eq!(delivering.status, OrderStatus::Delivering);

    let err = orders
        .cancel_order(id, Initiator::Customer(f.customer), None)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotCancellable(OrderStatus::Delivering));

    let delivered = orders.confirm_delivery(id).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    let err = orders.cancel_order(id, Initiator::Admin, None).await.unwrap_err();
    assert_eq!(err, OrderError::NotCancellable(OrderStatus::Delivered));

    // Failed transitions leave the stored order untouched.
    assert_eq!(orders.get_order(id).await.unwrap(), delivered);
}

#[tokio::test]
async fn stale_revision_loses_the_race() {
    let f = setup(OrderConfig::default()).await;
    let orders = &f.system.order_client;
    let id = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    let seen = orders.get_order(id).await.unwrap().revision;

    let (accept, reject) = tokio::join!(
        orders.accept_order_if_revision(id, seen, 15),
        orders.reject_order_if_revision(id, seen, "Too busy"),
    );
    let outcomes = [accept.is_ok(), reject.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

    let loser = accept.err().or(reject.err()).unwrap();
    assert_eq!(
        loser,
        OrderError::Conflict {
            expected: seen,
            actual: seen + 1
        }
    );
    assert!(loser.is_retryable());

    let err = orders
        .cancel_order_if_revision(id, seen, Initiator::Admin, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn stock_is_taken_on_accept_and_returned_on_cancel() {
    let f = setup(OrderConfig::default().with_stock_policy(StockPolicy::OnAccept)).await;
    let orders = &f.system.order_client;
    let products = &f.system.product_client;

    let id = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    assert_eq!(products.check_stock(f.momo).await.unwrap(), 10);

    let accepted = orders.accept_order(id, 15).await.unwrap();
    assert!(accepted.stock_reserved);
    assert_eq!(products.check_stock(f.momo).await.unwrap(), 8);
    assert_eq!(products.check_stock(f.tea).await.unwrap(), 9);

    let cancelled = orders
        .cancel_order(id, Initiator::Restaurant, Some("Ran out of gas".into()))
        .await
        .unwrap();
    assert!(!cancelled.stock_reserved);
    assert_eq!(products.check_stock(f.momo).await.unwrap(), 10);
    assert_eq!(products.check_stock(f.tea).await.unwrap(), 10);
}

#[tokio::test]
async fn accept_fails_when_stock_ran_out_since_placement() {
    let f = setup(OrderConfig::default().with_stock_policy(StockPolicy::OnAccept)).await;
    let orders = &f.system.order_client;
    let first = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();

    f.system
        .product_client
        .update_product(
            f.tea,
            ProductUpdate {
                stock: Some(0),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();

    let err = orders.accept_order(first, 15).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::InsufficientStock {
            product_id: f.tea,
            requested: 1,
            available: 0
        }
    );
    // Momo was reserved first and has been given back; the order is unchanged.
    assert_eq!(f.system.product_client.check_stock(f.momo).await.unwrap(), 10);
    let order = orders.get_order(first).await.unwrap();
    assert_eq!(order.restaurant_status, RestaurantStatus::Pending);
    assert_eq!(order.revision, 0);

    // New orders are refused up front.
    let err = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));
}

#[tokio::test]
async fn failed_prepaid_payment_holds_until_paid() {
    let f = setup(OrderConfig::default()).await;
    let orders = &f.system.order_client;
    let id = orders.place_order(f.cart(None, PaymentMethod::Khalti)).await.unwrap();

    orders
        .record_payment(id, PaymentMethod::Khalti, None, PaymentOutcome::Failed)
        .await
        .unwrap();
    orders.accept_order(id, 10).await.unwrap();
    let held = orders.advance_kitchen(id).await.unwrap();
    assert_eq!(held.restaurant_status, RestaurantStatus::Preparing);
    assert_eq!(held.status, OrderStatus::Pending);

    let paid = orders
        .record_payment(id, PaymentMethod::Khalti, Some("KH-77".into()), PaymentOutcome::Completed)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Preparing);
    assert_eq!(paid.payment_status, PaymentStatus::Completed);
    assert_eq!(paid.transaction_id.as_deref(), Some("KH-77"));
}

#[tokio::test]
async fn failed_prepaid_payment_cancels_under_cancel_policy() {
    let f = setup(OrderConfig::default().with_prepaid_failure_policy(PrepaidFailurePolicy::Cancel)).await;
    let orders = &f.system.order_client;
    let id = orders.place_order(f.cart(None, PaymentMethod::Esewa)).await.unwrap();

    let order = orders
        .record_payment(id, PaymentMethod::Esewa, None, PaymentOutcome::Failed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.cancellation.map(|c| c.by), Some(Initiator::System));
}

#[tokio::test]
async fn queries_and_income_report() {
    let f = setup(OrderConfig::default()).await;
    let orders = &f.system.order_client;

    let june = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    f.clock.set(Utc.with_ymd_and_hms(2026, 10, 2, 19, 0, 0).unwrap());
    orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    let cancelled = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    orders
        .cancel_order(cancelled, Initiator::Customer(f.customer), Some("Ordered twice".into()))
        .await
        .unwrap();

    let mine = orders.orders_for_user(f.customer).await.unwrap();
    assert_eq!(mine.len(), 3);
    assert_eq!(mine[0].id, june);
    assert_eq!(orders.orders_for_restaurant(f.restaurant).await.unwrap().len(), 3);
    assert!(orders.orders_for_restaurant(RestaurantId(77)).await.unwrap().is_empty());

    let income = orders.income_by_month(f.restaurant).await.unwrap();
    let rows: Vec<(String, Decimal)> = income.iter().map(|(m, total)| (m.to_string(), *total)).collect();
    assert_eq!(
        rows,
        [
            ("2026-06".to_string(), Decimal::from(300)),
            ("2026-10".to_string(), Decimal::from(300)),
        ]
    );
}

#[tokio::test]
async fn platform_income_spans_every_restaurant() {
    let f = setup(OrderConfig::default()).await;
    let orders = &f.system.order_client;
    let second = f
        .system
        .restaurant_client
        .approve(RestaurantId(2), restaurant_defaults(f.customer, "Newari Kitchen"))
        .await
        .unwrap()
        .id;
    let bara = f
        .system
        .product_client
        .create_product(ProductCreate::new(second, "Bara", Decimal::from(150), 10))
        .await
        .unwrap();

    orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    orders
        .place_order(OrderCreate {
            restaurant_id: second,
            items: vec![CartItem {
                product_id: bara,
                quantity: 1,
            }],
            ..f.cart(None, PaymentMethod::Cash)
        })
        .await
        .unwrap();
    let cancelled = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    orders.cancel_order(cancelled, Initiator::Admin, None).await.unwrap();

    let platform = orders.platform_income_by_month().await.unwrap();
    let rows: Vec<(String, Decimal)> = platform.iter().map(|(m, total)| (m.to_string(), *total)).collect();
    assert_eq!(rows, [("2026-06".to_string(), Decimal::from(500))]);

    let first_only = orders.income_by_month(f.restaurant).await.unwrap();
    assert_eq!(first_only.values().copied().collect::<Vec<_>>(), [Decimal::from(300)]);
}

#[tokio::test]
async fn catalog_refuses_prices_orders_could_not_total() {
    let f = setup(OrderConfig::default()).await;

    let err = f
        .system
        .product_client
        .create_product(ProductCreate::new(f.restaurant, "Gold Momo", Decimal::MAX, 1))
        .await
        .unwrap_err();
    assert_eq!(err, ProductError::InvalidPrice(Decimal::MAX));

    let err = f
        .system
        .product_client
        .update_product(
            f.momo,
            ProductUpdate {
                price: Some(MAX_PRICE + Decimal::ONE),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProductError::InvalidPrice(_)));

    let err = f
        .system
        .order_client
        .place_order(OrderCreate {
            items: vec![CartItem {
                product_id: f.momo,
                quantity: MAX_QUANTITY + 1,
            }],
            ..f.cart(None, PaymentMethod::Cash)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidQuantity { .. }));

    // The most expensive allowed cart still totals.
    let priciest = f
        .system
        .product_client
        .create_product(ProductCreate::new(f.restaurant, "Feast", MAX_PRICE, 1))
        .await
        .unwrap();
    let id = f
        .system
        .order_client
        .place_order(OrderCreate {
            items: vec![CartItem {
                product_id: priciest,
                quantity: MAX_QUANTITY,
            }],
            ..f.cart(None, PaymentMethod::Cash)
        })
        .await
        .unwrap();
    let order = f.system.order_client.get_order(id).await.unwrap();
    assert_eq!(order.subtotal, MAX_PRICE * Decimal::from(MAX_QUANTITY));
    assert!(order.totals_consistent());
}

#[tokio::test]
async fn only_owners_cancel_and_orders_are_never_deleted() {
    let f = setup(OrderConfig::default()).await;
    let orders = &f.system.order_client;
    let id = orders.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();

    let err = orders
        .cancel_order(id, Initiator::Customer(UserId(2)), None)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotOrderOwner { user_id: UserId(2) });

    assert_eq!(orders.delete(id).await.unwrap_err(), OrderError::DeletionForbidden);
    assert!(orders.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn receipt_reflects_the_delivered_order() {
    let geocoder: Arc<dyn Geocoder> =
        Arc::new(StaticGeocoder::new().with_place("Thamel", 27.7154, 85.3123));
    let f = setup_with_geocoder(OrderConfig::default(), Some(geocoder)).await;
    f.add_coupon("10PERCENT", ten_percent(200)).await;
    let orders = &f.system.order_client;

    let id = orders
        .place_order(f.cart(Some("10PERCENT"), PaymentMethod::Esewa))
        .await
        .unwrap();
    orders.accept_order(id, 25).await.unwrap();
    orders
        .record_payment(id, PaymentMethod::Esewa, Some("ES-1".into()), PaymentOutcome::Completed)
        .await
        .unwrap();
    orders.advance_kitchen(id).await.unwrap();
    orders.advance_kitchen(id).await.unwrap();
    orders.dispatch_order(id).await.unwrap();
    orders.confirm_delivery(id).await.unwrap();

    let receipt = f.system.get_receipt(id).await.unwrap();
    assert_eq!(receipt.customer_name.as_deref(), Some("Alice"));
    assert_eq!(receipt.total, Decimal::from(275));
    assert_eq!(receipt.status, OrderStatus::Delivered);
    assert_eq!(receipt.coordinates, Some(Coordinates { lat: 27.7154, lng: 85.3123 }));
    assert_eq!(receipt.delivery_address, "Chaksibari Marg, Thamel, Kathmandu");

    let text = receipt.to_string();
    assert!(text.contains("Masala Tea"));
    assert!(text.contains("Delivery: NPR 50.00"));
    assert!(text.contains("ref ES-1"));

    let missing = f.system.get_receipt(order_service::model::OrderId(404)).await.unwrap_err();
    assert_eq!(missing, OrderError::OrderNotFound("order_404".into()));
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

/// Holds every lookup until the test opens the gate.
struct GatedGeocoder {
    gate: Arc<Notify>,
}

#[async_trait]
impl Geocoder for GatedGeocoder {
    async fn forward(&self, _query: &AddressQuery) -> Result<Coordinates, GeocodeError> {
        self.gate.notified().await;
        Ok(Coordinates {
            lat: 27.7154,
            lng: 85.3123,
        })
    }
}

#[tokio::test]
async fn slow_geocoding_does_not_hold_up_other_orders() {
    let gate = Arc::new(Notify::new());
    let geocoder: Arc<dyn Geocoder> = Arc::new(GatedGeocoder { gate: gate.clone() });
    let f = setup_with_geocoder(OrderConfig::default(), Some(geocoder)).await;

    let mut located = f.cart(None, PaymentMethod::Cash);
    located.delivery_address.coordinates = Some(Coordinates {
        lat: 27.7,
        lng: 85.3,
    });
    let first = f.system.order_client.place_order(located).await.unwrap();

    let orders = f.system.order_client.clone();
    let waiting = tokio::spawn({
        let cart = f.cart(None, PaymentMethod::Cash);
        async move { orders.place_order(cart).await }
    });

    let accepted = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        f.system.order_client.accept_order(first, 15),
    )
    .await
    .expect("accept blocked behind a geocoding lookup")
    .unwrap();
    assert_eq!(accepted.restaurant_status, RestaurantStatus::Accepted);

    gate.notify_one();
    let second = waiting.await.unwrap().unwrap();
    let order = f.system.order_client.get_order(second).await.unwrap();
    assert_eq!(order.delivery_address.coordinates.map(|c| c.lat), Some(27.7154));
}

#[tokio::test]
async fn geocoding_failure_does_not_fail_the_order() {
    let geocoder: Arc<dyn Geocoder> = Arc::new(StaticGeocoder::new());
    let f = setup_with_geocoder(OrderConfig::default(), Some(geocoder)).await;

    let id = f.system.order_client.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    let order = f.system.order_client.get_order(id).await.unwrap();
    assert_eq!(order.delivery_address.coordinates, None);
}

#[tokio::test]
async fn free_delivery_above_threshold() {
    let config = OrderConfig::default().with_delivery(order_service::model::DeliveryPolicy {
        flat_fee: Decimal::from(50),
        free_above: Some(Decimal::from(250)),
    });
    let f = setup(config).await;

    let id = f.system.order_client.place_order(f.cart(None, PaymentMethod::Cash)).await.unwrap();
    let order = f.system.order_client.get_order(id).await.unwrap();
    assert_eq!(order.delivery_charge, Decimal::ZERO);
    assert_eq!(order.total, Decimal::from(250));
    assert!(f.system.get_receipt(id).await.unwrap().to_string().contains("Delivery: FREE"));
}

impl Fixture {
    fn review(&self, product: Option<ProductId>, rating: u8, comment: &str) -> ReviewCreate {
        ReviewCreate {
            user_id: self.customer,
            restaurant_id: self.restaurant,
            product_id: product,
            rating,
            comment: comment.into(),
        }
    }
}

#[tokio::test]
async fn reviews_feed_the_restaurant_rating() {
    let f = setup(OrderConfig::default()).await;
    let reviews = &f.system.review_client;

    let first = reviews
        .post_review(f.review(Some(f.momo), 5, "Juicy momo"))
        .await
        .unwrap();
    f.clock.advance(Duration::hours(1));
    let second = reviews.post_review(f.review(None, 4, " Quick delivery ")).await.unwrap();
    f.clock.advance(Duration::hours(1));
    let third = reviews
        .post_review(f.review(Some(f.tea), 4, "Good chiya"))
        .await
        .unwrap();

    let restaurant = f.system.restaurant_client.get(f.restaurant).await.unwrap().unwrap();
    assert_eq!(restaurant.rating.total_reviews, 3);
    assert_eq!(restaurant.rating.average(), Decimal::new(43, 1));

    let listed: Vec<_> = reviews
        .reviews_for_restaurant(f.restaurant)
        .await
        .unwrap()
        .into_iter()
        .map(|review| review.id)
        .collect();
    assert_eq!(listed, [third, second, first]);

    let momo_reviews = reviews.reviews_for_product(f.momo).await.unwrap();
    assert_eq!(momo_reviews.len(), 1);
    assert_eq!(momo_reviews[0].comment, "Juicy momo");
    assert_eq!(momo_reviews[0].created_at, Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap());

    let second_review = reviews.get(second).await.unwrap().unwrap();
    assert_eq!(second_review.comment, "Quick delivery");
    assert_eq!(reviews.delete(second).await.unwrap_err(), ReviewError::Immutable);
}

#[tokio::test]
async fn refused_reviews_leave_the_rating_alone() {
    let f = setup(OrderConfig::default()).await;
    let reviews = &f.system.review_client;
    let other = f
        .system
        .restaurant_client
        .approve(RestaurantId(2), restaurant_defaults(f.customer, "Newari Kitchen"))
        .await
        .unwrap()
        .id;
    let bara = f
        .system
        .product_client
        .create_product(ProductCreate::new(other, "Bara", Decimal::from(150), 10))
        .await
        .unwrap();

    let err = reviews
        .post_review(ReviewCreate {
            restaurant_id: RestaurantId(99),
            ..f.review(None, 5, "Where is this?")
        })
        .await
        .unwrap_err();
    assert_eq!(err, ReviewError::RestaurantNotFound(RestaurantId(99)));

    let err = reviews
        .post_review(f.review(Some(bara), 5, "Wrong kitchen"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ReviewError::ProductNotSoldHere {
            product_id: bara,
            restaurant_id: f.restaurant
        }
    );

    let err = reviews
        .post_review(f.review(Some(ProductId(404)), 5, "Ghost dish"))
        .await
        .unwrap_err();
    assert_eq!(err, ReviewError::ProductNotFound(ProductId(404)));

    let err = reviews
        .post_review(ReviewCreate {
            user_id: UserId(77),
            ..f.review(None, 3, "Anonymous")
        })
        .await
        .unwrap_err();
    assert_eq!(err, ReviewError::UserNotFound(UserId(77)));

    let err = reviews.post_review(f.review(None, 0, "Zero stars")).await.unwrap_err();
    assert_eq!(err, ReviewError::InvalidRating(0));

    let restaurant = f.system.restaurant_client.get(f.restaurant).await.unwrap().unwrap();
    assert_eq!(restaurant.rating.total_reviews, 0);
    assert!(reviews.reviews_for_restaurant(f.restaurant).await.unwrap().is_empty());

    f.system.shutdown().await.unwrap();
}
