use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use validator::Validate;

use crate::dto::registration_dto::{RegisterVehicleRequest, RenewRegistrationRequest};
use crate::dto::transfer_dto::CreateTransferPaymentRequest;
use crate::dto::ApiResponse;
use crate::repositories::Store;
use crate::services::{RegistrationReceipt, RenewalOutcome, TransferDraft};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/register", post(register_vehicle::<S>))
        .route("/renew", post(renew_registration::<S>))
        .route("/create-transfer-payment", post(create_transfer_payment::<S>))
}

async fn register_vehicle<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RegisterVehicleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RegistrationReceipt>>), AppError> {
    let Json(request) = payload?;
    let receipt = state
        .registrations()
        .submit(&request.user_id, request.vehicle, request.registration, request.insurance)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            receipt,
            "Vehicle registration submitted, road tax payment pending",
        )),
    ))
}

async fn renew_registration<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RenewRegistrationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RenewalOutcome>>, AppError> {
    let Json(request) = payload?;
    let outcome = state
        .renewals()
        .renew(&request.user_id, &request.registration_number, request.insurance)
        .await?;

    let message = format!(
        "Registration renewed until {}",
        outcome.new_valid_until.format("%a %b %d %Y")
    );
    Ok(Json(ApiResponse::success_with_message(outcome, message)))
}

async fn create_transfer_payment<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTransferPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TransferDraft>>), AppError> {
    let Json(request) = payload?;
    request.validate()?;
    let draft = state
        .transfers()
        .draft_transfer(request.application_id, &request.current_owner_id, &request.new_owner_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(draft))))
}
