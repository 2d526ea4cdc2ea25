use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::{CartAdded, CartCount, CartView},
        orders::OrderWithItems,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::{cart_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart/", get(view_cart))
        .route("/cart/count/", get(cart_count))
        .route("/cart/add/{movie_id}/", get(add_to_cart).post(add_to_cart))
        .route("/cart/clear/", get(clear_cart).post(clear_cart))
        .route("/checkout/", get(checkout).post(checkout))
}

#[utoipa::path(
    get,
    path = "/cart/",
    responses(
        (status = 200, description = "Cart lines with totals", body = ApiResponse<CartView>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "A movie in the cart no longer exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::view_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/cart/count/",
    responses(
        (status = 200, description = "Total quantity in the cart", body = ApiResponse<CartCount>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let resp = cart_service::cart_count(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/cart/add/{movie_id}/",
    params(("movie_id" = Uuid, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "One more unit in the cart", body = ApiResponse<CartAdded>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Movie not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    Path(movie_id): Path<Uuid>,
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartAdded>>> {
    let resp = cart_service::add_to_cart(&state, &user, movie_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/cart/clear/",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/checkout/",
    responses(
        (status = 201, description = "Order created from the cart", body = ApiResponse<OrderWithItems>),
        (status = 303, description = "Cart empty, redirected to /movies/"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "A movie in the cart no longer exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(State(state): State<AppState>, user: AuthUser) -> AppResult<Response> {
    match order_service::checkout(&state, &user).await? {
        Some(order) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(
                "Checkout success",
                order,
                Some(Meta::empty()),
            )),
        )
            .into_response()),
        None => Ok(Redirect::to("/movies/").into_response()),
    }
}
