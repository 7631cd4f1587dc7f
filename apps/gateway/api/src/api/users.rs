use axum::Router;
use domain_users::{DocumentUserRepository, UserService, handlers};
use std::sync::Arc;

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = DocumentUserRepository::new(state.store.clone());
    let service = UserService::new(
        repository,
        Arc::clone(&state.identity),
        state.notifications.clone(),
    );
    handlers::router(service)
}
