//! Transitions of an order after it has been placed.

use crate::model::{Initiator, PaymentMethod, PaymentOutcome};

/// Every variant returns the order as it is after the action.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Restaurant accepts: `pending → accepted`.
    Accept { preparation_minutes: u32 },
    /// Restaurant rejects: `pending → rejected`, and the order is cancelled.
    Reject { reason: String },
    /// One kitchen step: `accepted → preparing → ready`.
    AdvanceKitchen,
    /// Rider picks up: `preparing → delivering`, kitchen must be `ready`.
    Dispatch,
    /// `delivering → delivered`.
    ConfirmDelivery,
    Cancel {
        by: Initiator,
        reason: Option<String>,
    },
    RecordPayment {
        method: PaymentMethod,
        transaction_id: Option<String>,
        outcome: PaymentOutcome,
    },
}

impl OrderAction {
    pub fn name(&self) -> &'static str {
        match self {
            OrderAction::Accept { .. } => "accept",
            OrderAction::Reject { .. } => "reject",
            OrderAction::AdvanceKitchen => "advance",
            OrderAction::Dispatch => "dispatch",
            OrderAction::ConfirmDelivery => "deliver",
            OrderAction::Cancel { .. } => "cancel",
            OrderAction::RecordPayment { .. } => "record payment for",
        }
    }
}
