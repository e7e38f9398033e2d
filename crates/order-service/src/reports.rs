//! Read-only aggregates over stored orders.

use crate::model::{Order, OrderStatus};
use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Sum of order totals per month of placement. Cancelled orders earn nothing.
pub fn income_by_month<'a>(orders: impl IntoIterator<Item = &'a Order>) -> BTreeMap<YearMonth, Decimal> {
    let mut income = BTreeMap::new();
    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        let month = YearMonth {
            year: order.created_at.year(),
            month: order.created_at.month(),
        };
        *income.entry(month).or_insert(Decimal::ZERO) += order.total;
    }
    income
}
