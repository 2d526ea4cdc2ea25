use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        movies::{MovieDetail, MovieList},
        reviews::ReviewForm,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    routes::params::MovieQuery,
    services::{movie_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies/", get(list_movies))
        .route("/movies/{id}/", get(movie_detail).post(submit_review))
}

#[utoipa::path(
    get,
    path = "/movies/",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List movies", body = ApiResponse<MovieList>)
    ),
    tag = "Movies"
)]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> AppResult<Json<ApiResponse<MovieList>>> {
    let resp = movie_service::list_movies(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/movies/{id}/",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie with its visible reviews", body = ApiResponse<MovieDetail>),
        (status = 404, description = "Movie not found"),
    ),
    tag = "Movies"
)]
pub async fn movie_detail(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<MovieDetail>>> {
    let resp = movie_service::get_movie_detail(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/movies/{id}/",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    request_body = ReviewForm,
    responses(
        (status = 201, description = "Review posted", body = ApiResponse<Review>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Invalid review"),
    ),
    security(("bearer_auth" = [])),
    tag = "Movies"
)]
pub async fn submit_review(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<ReviewForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::create_review(&state, &user, id, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
