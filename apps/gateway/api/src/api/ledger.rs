use axum::Router;
use domain_ledger::{LedgerService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let service = LedgerService::new(state.store.clone(), state.ledger.clone());
    handlers::router(service)
}
