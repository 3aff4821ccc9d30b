use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::dto::licensing_dto::{
    ApplyLearnerLicenceRequest, DrivingTestResponse, LearnerLicenceResponse, ScheduleTestRequest,
    VerifyLearnerLicenceRequest,
};
use crate::dto::ApiResponse;
use crate::repositories::Store;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_licensing_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/apply-ll", post(apply_learner_licence::<S>))
        .route("/api/verify-lln", post(verify_learner_licence::<S>))
        .route("/api/schedule-test", post(schedule_test::<S>))
}

async fn apply_learner_licence<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ApplyLearnerLicenceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<LearnerLicenceResponse>>), AppError> {
    let Json(request) = payload?;
    request.validate()?;
    let llno = state
        .licensing()
        .apply(&request.user_id, &request.licence_classes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            LearnerLicenceResponse { llno },
            "Learner licence application submitted",
        )),
    ))
}

async fn verify_learner_licence<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<VerifyLearnerLicenceRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let Json(request) = payload?;
    state.licensing().verify(request.llno, &request.user_id).await?;
    Ok(Json(ApiResponse::success(json!({ "llno": request.llno, "verified": true }))))
}

async fn schedule_test<S: Store>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ScheduleTestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<DrivingTestResponse>>), AppError> {
    let Json(request) = payload?;
    request.validate()?;
    let application_id = state
        .licensing()
        .schedule_test(&request.user_id, request.llno, request.test_date, &request.time_slot)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            DrivingTestResponse {
                application_id,
                llno: request.llno,
                test_date: request.test_date,
                time_slot: request.time_slot,
            },
            "Driving test scheduled",
        )),
    ))
}
