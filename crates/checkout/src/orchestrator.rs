//! Checkout orchestrator driving cart checkouts and instant buys.

use std::time::Instant;

use common::{Order, UserId};
use document_store::{CatalogStore, DocumentStore, UserStore, UserStoreExt};
use domain::{
    CheckoutCart, DomainError, InstantBuy, StoreContext, build_order_from_cart,
    build_order_from_single_product, order_total,
};
use serde::Serialize;

use crate::error::{CheckoutError, Result};
use crate::state::{CheckoutFlow, CheckoutStep};

/// The order produced by a successful run and the steps it went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub steps: Vec<CheckoutStep>,
}

/// Steps completed so far in one attempt.
#[derive(Debug)]
struct Progress {
    flow: CheckoutFlow,
    steps: Vec<CheckoutStep>,
}

impl Progress {
    fn start(flow: CheckoutFlow) -> Self {
        Self {
            flow,
            steps: vec![CheckoutStep::Start],
        }
    }

    fn advance(&mut self, step: CheckoutStep) {
        tracing::debug!(step = %step, "checkout step completed");
        self.steps.push(step);
    }

    fn last(&self) -> CheckoutStep {
        self.steps.last().copied().unwrap_or_default()
    }

    /// The step that was running when an error surfaced.
    fn failing_step(&self, err: &CheckoutError) -> CheckoutStep {
        err.failed_step()
            .or_else(|| self.last().next_in(self.flow))
            .unwrap_or(CheckoutStep::Start)
    }
}

/// Turns carts and single products into orders.
///
/// No lock serializes attempts for the same user: two concurrent checkouts
/// can both read the cart before either clears it.
pub struct CheckoutOrchestrator<S: DocumentStore> {
    ctx: StoreContext<S>,
}

impl<S: DocumentStore> CheckoutOrchestrator<S> {
    /// Creates a new checkout orchestrator.
    pub fn new(ctx: StoreContext<S>) -> Self {
        Self { ctx }
    }

    /// Checks out the user's cart.
    ///
    /// An empty cart is rejected with [`CheckoutError::EmptyCart`] before
    /// anything is written.
    #[tracing::instrument(skip(self), fields(user_id = %cmd.user_id))]
    pub async fn checkout_cart(&self, cmd: CheckoutCart) -> Result<CheckoutReceipt> {
        metrics::counter!("checkouts_total").increment(1);
        let started = Instant::now();
        let mut progress = Progress::start(CheckoutFlow::Cart);

        let result = self.run_checkout(cmd.user_id, &mut progress).await;
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(order) => {
                tracing::info!(order_id = %order.order_id, total = %order.price, "checkout completed");
                Ok(CheckoutReceipt {
                    order,
                    steps: progress.steps,
                })
            }
            Err(e) => {
                record_failure(&progress, &e);
                Err(e)
            }
        }
    }

    async fn run_checkout(&self, user_id: UserId, progress: &mut Progress) -> Result<Order> {
        let store = self.ctx.store();

        let lines = self.ctx.run(store.cart_lines(user_id)).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart(user_id));
        }
        progress.advance(CheckoutStep::CartLoaded);

        let aggregated = self.ctx.run(store.cart_total(user_id)).await?;
        let loaded = order_total(&lines)?;
        if loaded != aggregated {
            return Err(CheckoutError::CartChanged { loaded, aggregated });
        }
        let mut order = build_order_from_cart(&lines)?;
        progress.advance(CheckoutStep::TotalComputed);

        self.place_order(user_id, &mut order, progress).await?;

        if let Err(e) = self.ctx.run(store.clear_cart(user_id)).await {
            return Err(CheckoutError::CartClearFailed {
                order_id: order.order_id,
                source: e.into(),
            });
        }
        progress.advance(CheckoutStep::CartCleared);

        Ok(order)
    }

    /// Buys one product without reading or changing the cart.
    #[tracing::instrument(skip(self), fields(user_id = %cmd.user_id, product_id = %cmd.product_id))]
    pub async fn instant_buy(&self, cmd: InstantBuy) -> Result<CheckoutReceipt> {
        metrics::counter!("instant_buys_total").increment(1);
        let mut progress = Progress::start(CheckoutFlow::InstantBuy);

        let result = self.run_instant_buy(cmd, &mut progress).await;
        match result {
            Ok(order) => {
                tracing::info!(order_id = %order.order_id, total = %order.price, "instant buy completed");
                Ok(CheckoutReceipt {
                    order,
                    steps: progress.steps,
                })
            }
            Err(e) => {
                record_failure(&progress, &e);
                Err(e)
            }
        }
    }

    async fn run_instant_buy(&self, cmd: InstantBuy, progress: &mut Progress) -> Result<Order> {
        let product = self
            .ctx
            .run(self.ctx.store().find_product(cmd.product_id))
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(cmd.product_id.to_string()))?;

        let mut order = build_order_from_single_product(&product);
        self.place_order(cmd.user_id, &mut order, progress).await?;
        Ok(order)
    }

    /// Appends the order, then its detail lines, as two separate writes.
    async fn place_order(
        &self,
        user_id: UserId,
        order: &mut Order,
        progress: &mut Progress,
    ) -> Result<()> {
        let store = self.ctx.store();

        self.ctx
            .run(store.append_order(user_id, order.clone()))
            .await?;
        progress.advance(CheckoutStep::OrderAppended);

        let lines = order.order_cart.clone();
        if let Err(e) = self
            .ctx
            .run(store.append_order_detail_lines(user_id, order.order_id, lines.clone()))
            .await
        {
            return Err(CheckoutError::PartialCheckoutFailure {
                order_id: order.order_id,
                completed: CheckoutStep::OrderAppended,
                failed: CheckoutStep::LineItemsAppended,
                source: e.into(),
            });
        }
        order.order_list = lines;
        progress.advance(CheckoutStep::LineItemsAppended);

        Ok(())
    }
}

fn record_failure(progress: &Progress, err: &CheckoutError) {
    let flow = progress.flow.as_str();
    let step = progress.failing_step(err);
    metrics::counter!("checkout_failures_total", "flow" => flow, "step" => step.as_str())
        .increment(1);
    match err.order_id() {
        Some(order_id) => {
            tracing::error!(flow, step = %step, %order_id, error = %err, "checkout left partial state")
        }
        None => tracing::warn!(flow, step = %step, error = %err, "checkout failed"),
    }
}
