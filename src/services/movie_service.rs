use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::movies::{CreateMovieRequest, MovieDetail, MovieList, UpdateMovieRequest},
    entity::movies::{ActiveModel, Column, Entity as Movies},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Movie,
    response::{ApiResponse, Meta},
    routes::params::MovieQuery,
    services::review_service,
    state::AppState,
};

/// Build an `ILIKE` pattern matching `search` as a literal substring.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_movies(
    state: &AppState,
    query: MovieQuery,
) -> AppResult<ApiResponse<MovieList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.search() {
        condition = condition.add(Expr::col(Column::Title).ilike(contains_pattern(search)));
    }

    let finder = Movies::find()
        .filter(condition)
        .order_by_asc(Column::Title)
        .order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Movie::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Movies", MovieList { items }, Some(meta)))
}

pub async fn find_movie<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Movie> {
    Movies::find_by_id(id)
        .one(db)
        .await?
        .map(Movie::from)
        .ok_or(AppError::NotFound)
}

pub async fn get_movie_detail(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MovieDetail>> {
    let movie = find_movie(&state.orm, id).await?;
    let reviews = review_service::list_visible(&state.orm, movie.id).await?;
    Ok(ApiResponse::success(
        "Movie",
        MovieDetail { movie, reviews },
        Some(Meta::empty()),
    ))
}

/// Fetch the movies referenced by `ids`, keyed by id. Missing ids are absent.
pub async fn load_catalog<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Movie>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let movies = Movies::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(movies
        .into_iter()
        .map(|model| (model.id, Movie::from(model)))
        .collect())
}

pub async fn create_movie(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMovieRequest,
) -> AppResult<ApiResponse<Movie>> {
    ensure_admin(user)?;
    payload.validate()?;

    let movie = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        description: Set(payload.description),
        price: Set(payload.price),
        image: Set(payload.image),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "movie_create",
        "movies",
        serde_json::json!({ "movie_id": movie.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Movie created",
        Movie::from(movie),
        Some(Meta::empty()),
    ))
}

pub async fn update_movie(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMovieRequest,
) -> AppResult<ApiResponse<Movie>> {
    ensure_admin(user)?;
    let existing = Movies::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    payload.validate()?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image).filter(|i| !i.is_empty()));
    }

    let movie = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "movie_update",
        "movies",
        serde_json::json!({ "movie_id": movie.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Movie::from(movie),
        Some(Meta::empty()),
    ))
}

pub async fn delete_movie(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Movies::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "movie_delete",
        "movies",
        serde_json::json!({ "movie_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
