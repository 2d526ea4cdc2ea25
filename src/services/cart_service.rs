use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    cart::Cart,
    dto::cart::{CartAdded, CartCount, CartView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::movie_service::{find_movie, load_catalog},
    session::Session,
    state::AppState,
};

pub fn cart_of(session: &Session) -> AppResult<Cart> {
    Ok(session.get::<Cart>(Cart::SESSION_KEY)?.unwrap_or_default())
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let session = state.sessions.load(&state.orm, user).await?;
    let cart = cart_of(&session)?;
    let catalog = load_catalog(&state.orm, &cart.movie_ids()).await?;
    let priced = cart.price(&catalog)?;

    Ok(ApiResponse::success(
        "OK",
        CartView {
            items: priced.items,
            total_price: priced.total_price,
            item_count: cart.item_count(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn cart_count(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartCount>> {
    let session = state.sessions.load(&state.orm, user).await?;
    let cart = cart_of(&session)?;
    Ok(ApiResponse::success(
        "OK",
        CartCount {
            item_count: cart.item_count(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    movie_id: Uuid,
) -> AppResult<ApiResponse<CartAdded>> {
    let txn = state.orm.begin().await?;

    let movie = find_movie(&txn, movie_id).await?;
    let mut session = state.sessions.load_for_update(&txn, user).await?;
    let mut cart = cart_of(&session)?;
    let quantity = cart.add(movie.id);
    session.insert(Cart::SESSION_KEY, &cart)?;
    state.sessions.save(&txn, &session).await?;

    txn.commit().await?;

    tracing::debug!(user_id = %user.user_id, movie_id = %movie.id, quantity, "added to cart");
    Ok(ApiResponse::success(
        "Added to cart",
        CartAdded {
            movie_id: movie.id,
            quantity,
            item_count: cart.item_count(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;

    let mut session = state.sessions.load_for_update(&txn, user).await?;
    let mut cart = cart_of(&session)?;
    cart.clear();
    session.insert(Cart::SESSION_KEY, &cart)?;
    state.sessions.save(&txn, &session).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        CartView {
            items: Vec::new(),
            total_price: 0,
            item_count: 0,
        },
        Some(Meta::empty()),
    ))
}
