//! Checkout transaction engine.
//!
//! Converts a buyer's mutable cart into one or more immutable, seller-scoped
//! orders under all-or-nothing semantics:
//!
//! 1. Load the cart snapshot (price, stock, deletion flag, owning seller).
//! 2. Check the shipping precondition.
//! 3. Partition the lines by owning seller (platform-owned goods form one
//!    partition of their own).
//! 4. Materialize one order draft per partition from the snapshotted prices.
//! 5. Hand all drafts to the store's atomic commit, which verifies and
//!    decrements stock per line and clears the cart, or rolls back
//!    everything and leaves the cart untouched.
//!
//! The buyer-facing cart service (add/remove/view lines) lives here too,
//! since the cart is the engine's input.

pub mod cart;
pub mod engine;
pub mod error;
pub mod partition;

pub use cart::{CartError, CartService};
pub use engine::{CheckoutEngine, CheckoutReceipt};
pub use error::CheckoutError;
pub use partition::{SellerPartition, materialize, partition_by_seller};
