//! Checkout step machine.

use serde::{Deserialize, Serialize};

/// The steps a checkout attempt moves through.
///
/// ```text
/// Start ──► CartLoaded ──► TotalComputed ──► OrderAppended ──► LineItemsAppended ──► CartCleared
/// ```
///
/// An instant buy skips the cart steps and stops after `LineItemsAppended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStep {
    #[default]
    Start,
    CartLoaded,
    TotalComputed,
    OrderAppended,
    LineItemsAppended,
    /// Terminal success for a cart checkout.
    CartCleared,
}

impl CheckoutStep {
    /// Returns the step that follows this one, if any.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Start => Some(CheckoutStep::CartLoaded),
            CheckoutStep::CartLoaded => Some(CheckoutStep::TotalComputed),
            CheckoutStep::TotalComputed => Some(CheckoutStep::OrderAppended),
            CheckoutStep::OrderAppended => Some(CheckoutStep::LineItemsAppended),
            CheckoutStep::LineItemsAppended => Some(CheckoutStep::CartCleared),
            CheckoutStep::CartCleared => None,
        }
    }

    /// Returns the step that follows this one within `flow`, if any.
    pub fn next_in(&self, flow: CheckoutFlow) -> Option<CheckoutStep> {
        match (flow, self) {
            (CheckoutFlow::InstantBuy, CheckoutStep::Start) => Some(CheckoutStep::OrderAppended),
            (CheckoutFlow::InstantBuy, CheckoutStep::LineItemsAppended) => None,
            _ => self.next(),
        }
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Start => "Start",
            CheckoutStep::CartLoaded => "CartLoaded",
            CheckoutStep::TotalComputed => "TotalComputed",
            CheckoutStep::OrderAppended => "OrderAppended",
            CheckoutStep::LineItemsAppended => "LineItemsAppended",
            CheckoutStep::CartCleared => "CartCleared",
        }
    }
}

/// Which of the two order flows an attempt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutFlow {
    Cart,
    /// Single product, no cart steps.
    InstantBuy,
}

impl CheckoutFlow {
    /// Returns the flow name used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutFlow::Cart => "checkout",
            CheckoutFlow::InstantBuy => "instant_buy",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
