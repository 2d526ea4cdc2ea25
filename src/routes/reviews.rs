use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{MovieRef, ReviewForm},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/review/{id}/edit/", get(edit_review_form).post(edit_review))
        .route("/review/{id}/delete/", get(delete_review_confirm).post(delete_review))
        .route("/review/{id}/report/", post(report_review))
}

#[utoipa::path(
    get,
    path = "/review/{id}/edit/",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review to edit", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn edit_review_form(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::get_review_for_edit(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/review/{id}/edit/",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReviewForm,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found"),
        (status = 422, description = "Invalid review"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn edit_review(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<ReviewForm>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::update_review(&state, &user, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/review/{id}/delete/",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review pending deletion", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review_confirm(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::get_review_for_edit(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/review/{id}/delete/",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = ApiResponse<MovieRef>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MovieRef>>> {
    let resp = review_service::delete_review(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/review/{id}/report/",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review hidden pending moderation", body = ApiResponse<MovieRef>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn report_review(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MovieRef>>> {
    let resp = review_service::report_review(&state, &user, id).await?;
    Ok(Json(resp))
}
