//! The order state machine.
//!
//! Two axes move independently: `restaurant_status` (kitchen) and `status`
//! (overall lifecycle). The rules that tie them together:
//!
//! - a rejected order is always cancelled;
//! - an order is only dispatched once the kitchen is `ready`, so `delivered`
//!   implies `ready` held before;
//! - cancellation is only possible from `pending` or `preparing`.
//!
//! [`apply`] is pure: it changes the order in memory and reports what else
//! has to happen (stock). Re-applying a transition that already happened is
//! a no-op, so duplicated client requests are harmless.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::config::{OrderConfig, PrepaidFailurePolicy, StockPolicy};
use crate::model::{
    Cancellation, Initiator, Order, OrderStatus, PaymentMethod, PaymentOutcome, PaymentStatus,
    RestaurantStatus,
};
use chrono::{DateTime, Utc};

/// The configurable parts of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rules {
    pub stock: StockPolicy,
    pub prepaid_failure: PrepaidFailurePolicy,
}

impl From<&OrderConfig> for Rules {
    fn from(config: &OrderConfig) -> Self {
        Self {
            stock: config.stock_policy,
            prepaid_failure: config.prepaid_failure_policy,
        }
    }
}

/// Catalog side effect a transition asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    Keep,
    Reserve,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub changed: bool,
    pub stock: StockChange,
}

impl Outcome {
    fn unchanged() -> Self {
        Self {
            changed: false,
            stock: StockChange::Keep,
        }
    }

    fn changed() -> Self {
        Self {
            changed: true,
            stock: StockChange::Keep,
        }
    }

    fn with_stock(stock: StockChange) -> Self {
        Self {
            changed: true,
            stock,
        }
    }
}

fn invalid(action: &'static str, order: &Order) -> OrderError {
    OrderError::InvalidTransition {
        action,
        state: format!("{} (kitchen: {})", order.status, order.restaurant_status),
    }
}

/// Applies `action` to `order`.
///
/// On error the order may be partially modified; the actor discards it.
pub fn apply(
    order: &mut Order,
    action: OrderAction,
    rules: &Rules,
    now: DateTime<Utc>,
) -> Result<Outcome, OrderError> {
    let name = action.name();
    match action {
        OrderAction::Accept {
            preparation_minutes,
        } => match order.restaurant_status {
            RestaurantStatus::Accepted => Ok(Outcome::unchanged()),
            RestaurantStatus::Pending if order.status == OrderStatus::Pending => {
                order.restaurant_status = RestaurantStatus::Accepted;
                order.preparation_time_minutes = Some(preparation_minutes);
                Ok(match rules.stock {
                    StockPolicy::OnAccept => Outcome::with_stock(StockChange::Reserve),
                    StockPolicy::None => Outcome::changed(),
                })
            }
            _ => Err(invalid(name, order)),
        },

        OrderAction::Reject { reason } => match order.restaurant_status {
            RestaurantStatus::Rejected => Ok(Outcome::unchanged()),
            RestaurantStatus::Pending => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(OrderError::Validation("a rejection reason is required".into()));
                }
                order.restaurant_status = RestaurantStatus::Rejected;
                order.rejection_reason = Some(reason.to_string());
                // A customer may already have cancelled; keep their record.
                let stock = if order.status == OrderStatus::Cancelled {
                    StockChange::Keep
                } else {
                    cancel(order, Initiator::Restaurant, Some(reason.to_string()), now)
                };
                Ok(Outcome::with_stock(stock))
            }
            _ => Err(invalid(name, order)),
        },

        OrderAction::AdvanceKitchen => {
            if order.status == OrderStatus::Cancelled {
                return Err(invalid(name, order));
            }
            match order.restaurant_status {
                RestaurantStatus::Accepted => {
                    order.restaurant_status = RestaurantStatus::Preparing;
                    if order.status == OrderStatus::Pending && !order.is_payment_hold() {
                        order.status = OrderStatus::Preparing;
                    }
                    Ok(Outcome::changed())
                }
                RestaurantStatus::Preparing => {
                    order.restaurant_status = RestaurantStatus::Ready;
                    Ok(Outcome::changed())
                }
                _ => Err(invalid(name, order)),
            }
        }

        OrderAction::Dispatch => match (order.status, order.restaurant_status) {
            (OrderStatus::Delivering, _) => Ok(Outcome::unchanged()),
            (OrderStatus::Preparing, RestaurantStatus::Ready) => {
                order.status = OrderStatus::Delivering;
                Ok(Outcome::changed())
            }
            _ => Err(invalid(name, order)),
        },

        OrderAction::ConfirmDelivery => match order.status {
            OrderStatus::Delivered => Ok(Outcome::unchanged()),
            OrderStatus::Delivering => {
                order.status = OrderStatus::Delivered;
                Ok(Outcome::changed())
            }
            _ => Err(invalid(name, order)),
        },

        OrderAction::Cancel { by, reason } => {
            if let Initiator::Customer(user_id) = by {
                if user_id != order.user_id {
                    return Err(OrderError::NotOrderOwner { user_id });
                }
            }
            match order.status {
                OrderStatus::Cancelled => Ok(Outcome::unchanged()),
                status if status.is_cancellable() => {
                    Ok(Outcome::with_stock(cancel(order, by, reason, now)))
                }
                status => Err(OrderError::NotCancellable(status)),
            }
        }

        OrderAction::RecordPayment {
            method,
            transaction_id,
            outcome,
        } => {
            let transaction_id = transaction_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty());
            match outcome {
                PaymentOutcome::Completed => complete_payment(order, method, transaction_id, name),
                PaymentOutcome::Failed => fail_payment(order, method, rules, now, name),
            }
        }
    }
}

/// Moves the order to `cancelled` and returns the stock change it needs.
fn cancel(
    order: &mut Order,
    by: Initiator,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> StockChange {
    order.status = OrderStatus::Cancelled;
    order.cancellation = Some(Cancellation { by, reason, at: now });
    if order.stock_reserved {
        StockChange::Release
    } else {
        StockChange::Keep
    }
}

fn complete_payment(
    order: &mut Order,
    method: PaymentMethod,
    transaction_id: Option<String>,
    name: &'static str,
) -> Result<Outcome, OrderError> {
    if method.is_prepaid() && transaction_id.is_none() {
        return Err(OrderError::Validation(format!(
            "a transaction id is required for {method} payments"
        )));
    }
    if order.payment_status == PaymentStatus::Completed {
        if order.payment_method == method && order.transaction_id == transaction_id {
            return Ok(Outcome::unchanged());
        }
        return Err(invalid(name, order));
    }
    if order.status == OrderStatus::Cancelled {
        return Err(invalid(name, order));
    }

    order.payment_method = method;
    order.payment_status = PaymentStatus::Completed;
    order.transaction_id = transaction_id;

    // Lift a hold left by an earlier failed payment.
    if order.status == OrderStatus::Pending
        && matches!(
            order.restaurant_status,
            RestaurantStatus::Preparing | RestaurantStatus::Ready
        )
    {
        order.status = OrderStatus::Preparing;
    }
    Ok(Outcome::changed())
}

fn fail_payment(
    order: &mut Order,
    method: PaymentMethod,
    rules: &Rules,
    now: DateTime<Utc>,
    name: &'static str,
) -> Result<Outcome, OrderError> {
    match order.payment_status {
        PaymentStatus::Completed => return Err(invalid(name, order)),
        PaymentStatus::Failed if order.payment_method == method => {
            return Ok(Outcome::unchanged())
        }
        _ => {}
    }

    order.payment_method = method;
    order.payment_status = PaymentStatus::Failed;

    let cancels = method.is_prepaid()
        && rules.prepaid_failure == PrepaidFailurePolicy::Cancel
        && order.status.is_cancellable();
    if cancels {
        let stock = cancel(order, Initiator::System, Some("payment failed".into()), now);
        return Ok(Outcome::with_stock(stock));
    }
    Ok(Outcome::changed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DeliveryAddress, OrderId, OrderItem, ProductId, RestaurantId, UserId,
    };
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 30, 0).unwrap()
    }

    fn order(method: PaymentMethod) -> Order {
        Order {
            id: OrderId(1),
            user_id: UserId(7),
            restaurant_id: RestaurantId(3),
            items: vec![OrderItem {
                product_id: ProductId(1),
                name: "Chicken Momo".into(),
                quantity: 2,
                unit_price: Decimal::from(100),
            }],
            subtotal: Decimal::from(200),
            discount_amount: Decimal::ZERO,
            coupon_code: None,
            delivery_charge: Decimal::from(50),
            total: Decimal::from(250),
            delivery_address: DeliveryAddress::new("Durbar Marg", "Kathmandu"),
            restaurant_status: RestaurantStatus::Pending,
            rejection_reason: None,
            preparation_time_minutes: None,
            status: OrderStatus::Pending,
            payment_method: method,
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            cancellation: None,
            stock_reserved: false,
            revision: 0,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn run(order: &mut Order, action: OrderAction) -> Result<Outcome, OrderError> {
        apply(order, action, &Rules::default(), now())
    }

    fn accept() -> OrderAction {
        OrderAction::Accept {
            preparation_minutes: 20,
        }
    }

    fn walk_to_delivering(order: &mut Order) {
        run(order, accept()).unwrap();
        run(order, OrderAction::AdvanceKitchen).unwrap();
        run(order, OrderAction::AdvanceKitchen).unwrap();
        run(order, OrderAction::Dispatch).unwrap();
    }

    #[test]
    fn happy_path_reaches_delivered() {
        let mut o = order(PaymentMethod::Cash);
        walk_to_delivering(&mut o);
        assert_eq!(o.status, OrderStatus::Delivering);
        assert_eq!(o.restaurant_status, RestaurantStatus::Ready);

        run(&mut o, OrderAction::ConfirmDelivery).unwrap();
        assert_eq!(o.status, OrderStatus::Delivered);
    }

    #[test]
    fn accept_twice_is_a_no_op() {
        let mut o = order(PaymentMethod::Cash);
        assert!(run(&mut o, accept()).unwrap().changed);
        let before = o.clone();

        let again = run(&mut o, OrderAction::Accept { preparation_minutes: 45 }).unwrap();
        assert!(!again.changed);
        assert_eq!(o, before);
        assert_eq!(o.preparation_time_minutes, Some(20));
    }

    #[test]
    fn reject_cancels_the_order() {
        let mut o = order(PaymentMethod::Cash);
        run(&mut o, OrderAction::Reject { reason: "Out of gas".into() }).unwrap();
        assert_eq!(o.restaurant_status, RestaurantStatus::Rejected);
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert_eq!(o.rejection_reason.as_deref(), Some("Out of gas"));
        assert_eq!(o.cancellation.as_ref().map(|c| c.by), Some(Initiator::Restaurant));
    }

    #[test]
    fn reject_after_accept_is_invalid() {
        let mut o = order(PaymentMethod::Cash);
        run(&mut o, accept()).unwrap();
        let err = run(&mut o, OrderAction::Reject { reason: "late".into() }).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { action: "reject", .. }));
        assert_eq!(o.status, OrderStatus::Pending);
    }

    #[test]
    fn reject_needs_a_reason() {
        let mut o = order(PaymentMethod::Cash);
        let err = run(&mut o, OrderAction::Reject { reason: "  ".into() }).unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn kitchen_moves_one_step_at_a_time() {
        let mut o = order(PaymentMethod::Cash);
        let err = run(&mut o, OrderAction::AdvanceKitchen).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));

        run(&mut o, accept()).unwrap();
        run(&mut o, OrderAction::AdvanceKitchen).unwrap();
        assert_eq!(o.restaurant_status, RestaurantStatus::Preparing);
        assert_eq!(o.status, OrderStatus::Preparing);

        run(&mut o, OrderAction::AdvanceKitchen).unwrap();
        assert_eq!(o.restaurant_status, RestaurantStatus::Ready);
        assert!(run(&mut o, OrderAction::AdvanceKitchen).is_err());
    }

    #[test]
    fn dispatch_requires_ready_kitchen() {
        let mut o = order(PaymentMethod::Cash);
        run(&mut o, accept()).unwrap();
        run(&mut o, OrderAction::AdvanceKitchen).unwrap();
        let err = run(&mut o, OrderAction::Dispatch).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { action: "dispatch", .. }));

        let err = run(&mut o, OrderAction::ConfirmDelivery).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { action: "deliver", .. }));
    }

    #[test]
    fn cancel_is_refused_once_out_for_delivery() {
        let mut o = order(PaymentMethod::Cash);
        walk_to_delivering(&mut o);
        let cancel = OrderAction::Cancel {
            by: Initiator::Admin,
            reason: None,
        };
        assert_eq!(
            run(&mut o, cancel.clone()).unwrap_err(),
            OrderError::NotCancellable(OrderStatus::Delivering)
        );

        run(&mut o, OrderAction::ConfirmDelivery).unwrap();
        assert_eq!(
            run(&mut o, cancel).unwrap_err(),
            OrderError::NotCancellable(OrderStatus::Delivered)
        );
    }

    #[test]
    fn customers_cancel_only_their_own_orders() {
        let mut o = order(PaymentMethod::Cash);
        let err = run(
            &mut o,
            OrderAction::Cancel {
                by: Initiator::Customer(UserId(99)),
                reason: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, OrderError::NotOrderOwner { user_id: UserId(99) });

        run(
            &mut o,
            OrderAction::Cancel {
                by: Initiator::Customer(UserId(7)),
                reason: Some("changed my mind".into()),
            },
        )
        .unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);

        // Cancelling again returns the current state.
        let again = run(
            &mut o,
            OrderAction::Cancel {
                by: Initiator::Customer(UserId(7)),
                reason: None,
            },
        )
        .unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn accept_after_customer_cancel_is_invalid() {
        let mut o = order(PaymentMethod::Cash);
        run(
            &mut o,
            OrderAction::Cancel {
                by: Initiator::Customer(UserId(7)),
                reason: None,
            },
        )
        .unwrap();
        assert!(matches!(
            run(&mut o, accept()),
            Err(OrderError::InvalidTransition { action: "accept", .. })
        ));
    }

    #[test]
    fn stock_is_reserved_on_accept_and_released_on_cancel() {
        let rules = Rules {
            stock: StockPolicy::OnAccept,
            ..Rules::default()
        };
        let mut o = order(PaymentMethod::Cash);
        let accepted = apply(&mut o, accept(), &rules, now()).unwrap();
        assert_eq!(accepted.stock, StockChange::Reserve);

        o.stock_reserved = true;
        let cancelled = apply(
            &mut o,
            OrderAction::Cancel {
                by: Initiator::Restaurant,
                reason: None,
            },
            &rules,
            now(),
        )
        .unwrap();
        assert_eq!(cancelled.stock, StockChange::Release);
    }

    #[test]
    fn completed_prepaid_payment_needs_transaction_id() {
        let mut o = order(PaymentMethod::Esewa);
        let err = run(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Esewa,
                transaction_id: Some("   ".into()),
                outcome: PaymentOutcome::Completed,
            },
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));

        run(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Esewa,
                transaction_id: Some("ES-0042".into()),
                outcome: PaymentOutcome::Completed,
            },
        )
        .unwrap();
        assert_eq!(o.payment_status, PaymentStatus::Completed);
        assert_eq!(o.transaction_id.as_deref(), Some("ES-0042"));
    }

    #[test]
    fn duplicate_payment_confirmation_is_a_no_op() {
        let mut o = order(PaymentMethod::Khalti);
        let record = OrderAction::RecordPayment {
            method: PaymentMethod::Khalti,
            transaction_id: Some("KH-1".into()),
            outcome: PaymentOutcome::Completed,
        };
        assert!(run(&mut o, record.clone()).unwrap().changed);
        assert!(!run(&mut o, record).unwrap().changed);

        let other = OrderAction::RecordPayment {
            method: PaymentMethod::Khalti,
            transaction_id: Some("KH-2".into()),
            outcome: PaymentOutcome::Completed,
        };
        assert!(matches!(run(&mut o, other), Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn failed_prepaid_payment_holds_the_order_at_pending() {
        let mut o = order(PaymentMethod::Khalti);
        run(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Khalti,
                transaction_id: None,
                outcome: PaymentOutcome::Failed,
            },
        )
        .unwrap();
        assert_eq!(o.payment_status, PaymentStatus::Failed);
        assert_eq!(o.transaction_id, None);

        run(&mut o, accept()).unwrap();
        run(&mut o, OrderAction::AdvanceKitchen).unwrap();
        assert_eq!(o.restaurant_status, RestaurantStatus::Preparing);
        assert_eq!(o.status, OrderStatus::Pending);
        assert!(run(&mut o, OrderAction::AdvanceKitchen).is_ok());
        assert!(run(&mut o, OrderAction::Dispatch).is_err());

        // A successful retry releases the hold.
        run(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Khalti,
                transaction_id: Some("KH-9".into()),
                outcome: PaymentOutcome::Completed,
            },
        )
        .unwrap();
        assert_eq!(o.status, OrderStatus::Preparing);
        run(&mut o, OrderAction::Dispatch).unwrap();
        assert_eq!(o.status, OrderStatus::Delivering);
    }

    #[test]
    fn failed_cash_payment_does_not_block_progress() {
        let mut o = order(PaymentMethod::Cash);
        run(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Cash,
                transaction_id: None,
                outcome: PaymentOutcome::Failed,
            },
        )
        .unwrap();
        walk_to_delivering(&mut o);
        assert_eq!(o.status, OrderStatus::Delivering);
    }

    #[test]
    fn cancel_policy_cancels_on_failed_prepaid_payment() {
        let rules = Rules {
            prepaid_failure: PrepaidFailurePolicy::Cancel,
            ..Rules::default()
        };
        let mut o = order(PaymentMethod::Esewa);
        apply(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Esewa,
                transaction_id: None,
                outcome: PaymentOutcome::Failed,
            },
            &rules,
            now(),
        )
        .unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert_eq!(o.cancellation.as_ref().map(|c| c.by), Some(Initiator::System));
    }

    #[test]
    fn payment_on_cancelled_order_is_invalid() {
        let mut o = order(PaymentMethod::Esewa);
        run(&mut o, OrderAction::Reject { reason: "closed".into() }).unwrap();
        let err = run(
            &mut o,
            OrderAction::RecordPayment {
                method: PaymentMethod::Esewa,
                transaction_id: Some("ES-1".into()),
                outcome: PaymentOutcome::Completed,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::order_actor::ErrorKind::InvalidTransition);
    }
}
