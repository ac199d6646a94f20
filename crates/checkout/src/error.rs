//! Checkout error taxonomy.

use market_store::StoreError;
use thiserror::Error;

/// Errors a checkout call can surface to the buyer.
///
/// `EmptyCart` and `MissingAddress` are user-input errors detected before
/// the transaction opens; `InsufficientStock` is a consistency violation
/// that rolled the whole transaction back; `Transaction` is any other
/// storage failure, reported without internal detail.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The buyer's cart has no lines. Nothing was created.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The buyer has no shipping address on file. Nothing was created.
    #[error("Please add a shipping address to your profile before checking out")]
    MissingAddress,

    /// A product could not cover its requested quantity; the entire
    /// checkout was rolled back across all sellers.
    #[error("Not enough stock for product '{product_name}'")]
    InsufficientStock { product_name: String },

    /// Unexpected storage failure; the transaction was rolled back.
    #[error("Checkout could not be completed")]
    Transaction(#[source] StoreError),
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock { product_name } => {
                CheckoutError::InsufficientStock { product_name }
            }
            other => CheckoutError::Transaction(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_is_lifted_out_of_store_errors() {
        let err: CheckoutError = StoreError::InsufficientStock {
            product_name: "Widget".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { ref product_name } if product_name == "Widget"
        ));
    }

    #[test]
    fn test_other_store_errors_become_generic_transaction_failures() {
        let err: CheckoutError =
            StoreError::BuyerNotFound(common::BuyerId::new()).into();
        assert!(matches!(err, CheckoutError::Transaction(_)));
        // The user-facing message leaks nothing about the cause.
        assert_eq!(err.to_string(), "Checkout could not be completed");
    }
}
