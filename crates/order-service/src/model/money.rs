//! Money arithmetic shared by the assembler, the coupon evaluator and receipts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds to 2 decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Highest catalog price a product may carry.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Highest quantity of one product in a cart.
pub const MAX_QUANTITY: u32 = 9999;

/// `unit_price × quantity`, rounded. `None` on overflow.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity)).map(round_money)
}

/// Sum of `amounts`. `None` on overflow.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// How the delivery charge of an order is derived from its subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    pub flat_fee: Decimal,
    /// Subtotal at or above which delivery is free. `None` means never free.
    pub free_above: Option<Decimal>,
}

impl DeliveryPolicy {
    pub fn flat(fee: Decimal) -> Self {
        Self {
            flat_fee: fee,
            free_above: None,
        }
    }

    pub fn charge_for(&self, subtotal: Decimal) -> Decimal {
        match self.free_above {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ => round_money(self.flat_fee),
        }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::flat(Decimal::from(50))
    }
}
