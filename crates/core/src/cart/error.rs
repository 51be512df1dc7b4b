//! Cart error types.

use thiserror::Error;

use crate::storage::StorageError;
use crate::types::ProductId;

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Checkout was requested on an empty cart.
    #[error("The cart is empty")]
    EmptyCart,

    /// Confirmation was requested with no checkout awaiting it.
    #[error("No checkout is awaiting confirmation")]
    NoPendingCheckout,

    /// The cart could not be serialized.
    #[error("cart serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The durable store rejected the write.
    #[error("cart storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Reasons persisted cart data is rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartDataError {
    /// A line item had a quantity of zero.
    #[error("line item {0} has a zero quantity")]
    ZeroQuantity(ProductId),

    /// Two line items shared the same product id.
    #[error("product {0} appears more than once")]
    DuplicateId(ProductId),

    /// The cart total does not fit the price range.
    #[error("cart total is out of range")]
    TotalOutOfRange,
}
