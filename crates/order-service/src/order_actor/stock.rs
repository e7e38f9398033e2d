//! Catalog stock side effects of order transitions.

use super::error::OrderError;
use crate::clients::ProductClient;
use crate::model::OrderItem;
use crate::product_actor::ProductError;
use tracing::{error, warn};

/// Takes every item out of stock, or nothing.
///
/// When one line cannot be reserved, lines already reserved are given back
/// before the error is returned.
pub(crate) async fn reserve_items(
    products: &ProductClient,
    items: &[OrderItem],
) -> Result<(), OrderError> {
    for (done, item) in items.iter().enumerate() {
        if let Err(e) = products.reserve_stock(item.product_id, item.quantity).await {
            warn!(product_id = %item.product_id, error = %e, "Stock reservation failed, rolling back");
            release_items(products, &items[..done]).await;
            return Err(match e {
                ProductError::InsufficientStock {
                    requested,
                    available,
                } => OrderError::InsufficientStock {
                    product_id: item.product_id,
                    requested,
                    available,
                },
                ProductError::NotFound(_) => OrderError::ProductNotFound(item.product_id),
                other => OrderError::dependency(other),
            });
        }
    }
    Ok(())
}

/// Gives stock back. Failures are logged and do not stop the remaining lines.
pub(crate) async fn release_items(products: &ProductClient, items: &[OrderItem]) {
    for item in items {
        if let Err(e) = products.release_stock(item.product_id, item.quantity).await {
            error!(
                product_id = %item.product_id,
                quantity = item.quantity,
                error = %e,
                "Failed to release stock"
            );
        }
    }
}
