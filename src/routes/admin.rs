use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        movies::{CreateMovieRequest, UpdateMovieRequest},
        orders::{OrderList, OrderWithItems},
        reviews::{ReviewList, UnreportRequest, UnreportResult},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Movie,
    response::ApiResponse,
    routes::params::{AdminOrderQuery, AdminReviewQuery},
    services::{admin_service, movie_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/movies", post(create_movie))
        .route("/admin/movies/{id}", put(update_movie).delete(delete_movie))
        .route("/admin/reviews", get(list_reviews))
        .route("/admin/reviews/unreport", post(unreport_reviews))
        .route("/admin/orders", get(list_all_orders))
        .route("/admin/orders/{id}", get(get_order_admin))
}

#[utoipa::path(
    post,
    path = "/admin/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = ApiResponse<Movie>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid movie"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Movie>>)> {
    let resp = movie_service::create_movie(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/admin/movies/{id}",
    params(("id" = Uuid, Path, description = "Movie ID")),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie updated", body = ApiResponse<Movie>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Invalid movie"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovieRequest>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let resp = movie_service::update_movie(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/admin/movies/{id}",
    params(("id" = Uuid, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = movie_service::delete_movie(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/reviews",
    params(
        ("reported" = Option<bool>, Query, description = "Filter by reported flag"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<ReviewList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminReviewQuery>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = admin_service::list_reviews(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/admin/reviews/unreport",
    request_body = UnreportRequest,
    responses(
        (status = 200, description = "Reported flag cleared", body = ApiResponse<UnreportResult>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn unreport_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UnreportRequest>,
) -> AppResult<Json<ApiResponse<UnreportResult>>> {
    let resp = admin_service::unreport_reviews(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Only this user's orders"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All orders, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminOrderQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Any order with items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}
