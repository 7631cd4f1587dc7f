use axum::{Json, Router, extract::State, routing::get};
use axum_helpers::errors::responses::InternalServerErrorResponse;
use database::firestore::Document;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::LedgerResult;
use crate::models::{
    CONTRIBUTIONS, EXPENSE_AMOUNT_FIELD, EXPENSES, ExpenseSum, JoinKeys, MEMBERS, PAYMENT_FIELD,
    PaymentSum, ROOMS, USERS,
};
use crate::service::LedgerService;

pub const TAG: &str = "ledger";

/// OpenAPI documentation for the read-only collection endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        all_users,
        user_emails,
        all_rooms,
        all_members,
        all_contributions,
        contribution_sum,
        all_expenses,
        expense_sum,
    ),
    components(
        schemas(PaymentSum, ExpenseSum),
        responses(InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Collection listings, joins and totals")
    )
)]
pub struct ApiDoc;

/// Create the ledger router with all HTTP endpoints
pub fn router(service: LedgerService) -> Router {
    Router::new()
        .route("/all", get(all_users))
        .route("/getEmails", get(user_emails))
        .route("/getallRooms", get(all_rooms))
        .route("/roomsCurrentUser", get(all_members))
        .route("/getallContribution", get(all_contributions))
        .route("/getallContributionSum", get(contribution_sum))
        .route("/getallExpense", get(all_expenses))
        .route("/getallExpenseSum", get(expense_sum))
        .with_state(Arc::new(service))
}

type Ledger = State<Arc<LedgerService>>;

#[utoipa::path(
    get,
    path = "/all",
    tag = TAG,
    responses(
        (status = 200, description = "Every user profile", body = Vec<Object>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn all_users(State(service): Ledger) -> LedgerResult<Json<Vec<Document>>> {
    Ok(Json(service.list_all(USERS).await?))
}

#[utoipa::path(
    get,
    path = "/getEmails",
    tag = TAG,
    responses(
        (status = 200, description = "Email of every user", body = Vec<String>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn user_emails(State(service): Ledger) -> LedgerResult<Json<Vec<String>>> {
    Ok(Json(service.list_emails().await?))
}

#[utoipa::path(
    get,
    path = "/getallRooms",
    tag = TAG,
    responses(
        (status = 200, description = "Every room", body = Vec<Object>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn all_rooms(State(service): Ledger) -> LedgerResult<Json<Vec<Document>>> {
    Ok(Json(service.list_all(ROOMS).await?))
}

/// Every room membership
#[utoipa::path(
    get,
    path = "/roomsCurrentUser",
    tag = TAG,
    responses(
        (status = 200, description = "Every member record", body = Vec<Object>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn all_members(State(service): Ledger) -> LedgerResult<Json<Vec<Document>>> {
    Ok(Json(service.list_all(MEMBERS).await?))
}

/// Contributions with room and user names attached
#[utoipa::path(
    get,
    path = "/getallContribution",
    tag = TAG,
    responses(
        (status = 200, description = "Contributions with r_name, u_name and u_img", body = Vec<Object>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn all_contributions(State(service): Ledger) -> LedgerResult<Json<Vec<Document>>> {
    Ok(Json(
        service
            .list_joined(CONTRIBUTIONS, JoinKeys::default())
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/getallContributionSum",
    tag = TAG,
    responses(
        (status = 200, description = "Total of all payments", body = PaymentSum),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn contribution_sum(State(service): Ledger) -> LedgerResult<Json<PaymentSum>> {
    let payment_sum = service.sum_field(CONTRIBUTIONS, PAYMENT_FIELD).await?;
    Ok(Json(PaymentSum { payment_sum }))
}

/// Expenses with room and user names attached
#[utoipa::path(
    get,
    path = "/getallExpense",
    tag = TAG,
    responses(
        (status = 200, description = "Expenses with r_name, u_name and u_img", body = Vec<Object>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn all_expenses(State(service): Ledger) -> LedgerResult<Json<Vec<Document>>> {
    Ok(Json(
        service.list_joined(EXPENSES, JoinKeys::default()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/getallExpenseSum",
    tag = TAG,
    responses(
        (status = 200, description = "Total of all expense amounts", body = ExpenseSum),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn expense_sum(State(service): Ledger) -> LedgerResult<Json<ExpenseSum>> {
    let expense_sum = service.sum_field(EXPENSES, EXPENSE_AMOUNT_FIELD).await?;
    Ok(Json(ExpenseSum { expense_sum }))
}
