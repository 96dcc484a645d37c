//! Shared application state.

use std::sync::Arc;

use checkout::CheckoutOrchestrator;
use document_store::DocumentStore;
use domain::{
    AccountService, Argon2PasswordHasher, CartLedger, CatalogService, JwtTokenIssuer, StoreContext,
};

use crate::config::Config;

/// Account service wired with the production hasher and token issuer.
pub type Accounts<S> = AccountService<S, Argon2PasswordHasher, JwtTokenIssuer>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub catalog: CatalogService<S>,
    pub cart: CartLedger<S>,
    pub checkout: CheckoutOrchestrator<S>,
    pub accounts: Accounts<S>,
}

impl<S: DocumentStore + Clone> AppState<S> {
    /// Wires every service to the same store under the configured timeout.
    pub fn new(store: S, config: &Config) -> Self {
        let ctx = StoreContext::with_timeout(store, config.store_timeout);
        Self {
            catalog: CatalogService::new(ctx.clone()),
            cart: CartLedger::new(ctx.clone()),
            checkout: CheckoutOrchestrator::new(ctx.clone()),
            accounts: AccountService::new(
                ctx,
                Argon2PasswordHasher::new(),
                JwtTokenIssuer::new(&config.jwt_secret),
            ),
        }
    }
}

/// Creates the default application state around a store.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(
    store: S,
    config: &Config,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, config))
}
