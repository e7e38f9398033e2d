#[derive(Debug, Clone)]
pub enum RestaurantAction {
    /// Marks the restaurant approved and active.
    Approve,
    /// Opens or closes the restaurant for new orders.
    SetActive(bool),
    /// Counts one review with the given stars into the rating.
    AddRating(u8),
}
