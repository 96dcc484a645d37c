//! Checkout orchestration.
//!
//! A cart checkout runs these steps against the user document:
//! 1. Load the cart lines
//! 2. Compute the total through the store aggregate
//! 3. Append the order to the order history
//! 4. Append the detail lines to that order
//! 5. Clear the cart
//!
//! The writes are separate single-document updates. A failure after the
//! first write leaves the earlier writes in place and is reported with the
//! step that failed; nothing is rolled back.

pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::CheckoutError;
pub use orchestrator::{CheckoutOrchestrator, CheckoutReceipt};
pub use state::{CheckoutFlow, CheckoutStep};
