use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::dto::transfer_dto::CompleteTransferRequest;
use crate::dto::ApiResponse;
use crate::models::Payment;
use crate::repositories::Store;
use crate::services::TransferOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_payment_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/complete-transfer", post(complete_transfer::<S>))
        .route("/:transaction_id", get(get_payment::<S>))
        .route("/:transaction_id/complete", post(complete_payment::<S>))
}

async fn complete_transfer<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CompleteTransferRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TransferOutcome>>, AppError> {
    let Json(request) = payload?;
    request.validate()?;
    let outcome = state
        .transfers()
        .complete_transfer(&request.transaction_id, &request.new_owner_id, &request.registration_number)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        outcome,
        "Ownership transferred successfully",
    )))
}

async fn get_payment<S: Store>(
    State(state): State<AppState<S>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = state.ledger().get_payment(&transaction_id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

async fn complete_payment<S: Store>(
    State(state): State<AppState<S>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = state.ledger().complete_payment(&transaction_id).await?;
    Ok(Json(ApiResponse::success_with_message(payment, "Payment completed")))
}
