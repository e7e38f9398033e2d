//! Custom actions for the Product actor.

/// Stock operations on a single product.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level.
    CheckStock,
    /// Takes units out of stock. Fails if fewer are available.
    ReserveStock(u32),
    /// Puts previously reserved units back.
    ReleaseStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    ReserveStock(u32),
    ReleaseStock(u32),
}
