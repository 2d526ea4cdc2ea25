use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::reviews::{MovieRef, ReviewForm},
    entity::{
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::Review,
    response::{ApiResponse, Meta},
    services::movie_service::find_movie,
    state::AppState,
};

/// Reviews shown on a movie page: everything not reported, oldest first.
pub async fn list_visible<C: ConnectionTrait>(db: &C, movie_id: Uuid) -> AppResult<Vec<Review>> {
    let rows = Reviews::find()
        .filter(ReviewCol::MovieId.eq(movie_id))
        .filter(ReviewCol::IsReported.eq(false))
        .order_by_asc(ReviewCol::CreatedAt)
        .find_also_related(Users)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(review, author)| Review::from_entity(review, author))
        .collect())
}

async fn find_review<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<ReviewModel> {
    Reviews::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

/// Load a review the caller is allowed to modify.
async fn find_owned_review(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ReviewModel> {
    let review = find_review(&state.orm, id).await?;
    ensure_owner(user, review.user_id)?;
    Ok(review)
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    movie_id: Uuid,
    form: ReviewForm,
) -> AppResult<ApiResponse<Review>> {
    let movie = find_movie(&state.orm, movie_id).await?;
    let form = form.normalized();
    form.validate()?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        movie_id: Set(movie.id),
        user_id: Set(user.user_id),
        comment: Set(form.comment),
        created_at: NotSet,
        is_reported: Set(false),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "movie_id": movie.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review posted",
        Review::from_entity(review, None),
        Some(Meta::empty()),
    ))
}

pub async fn get_review_for_edit(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    let review = find_owned_review(state, user, id).await?;
    Ok(ApiResponse::success(
        "Review",
        Review::from_entity(review, None),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ReviewForm,
) -> AppResult<ApiResponse<Review>> {
    let review = find_owned_review(state, user, id).await?;
    let form = form.normalized();
    form.validate()?;

    let mut active: ReviewActive = review.into();
    active.comment = Set(form.comment);
    let review = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_update",
        "reviews",
        serde_json::json!({ "review_id": review.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review updated",
        Review::from_entity(review, None),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<MovieRef>> {
    let review = find_owned_review(state, user, id).await?;
    Reviews::delete_by_id(review.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": review.id, "movie_id": review.movie_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review deleted",
        MovieRef {
            movie_id: review.movie_id,
        },
        Some(Meta::empty()),
    ))
}

/// Flag a review for moderation. Any signed-in user may report any review,
/// repeatedly; the flag is simply set.
pub async fn report_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<MovieRef>> {
    let review = find_review(&state.orm, id).await?;
    let movie_id = review.movie_id;

    let mut active: ReviewActive = review.into();
    active.is_reported = Set(true);
    let review = active.update(&state.orm).await?;

    tracing::info!(review_id = %review.id, reporter = %user.user_id, "review reported");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_report",
        "reviews",
        serde_json::json!({ "review_id": review.id, "movie_id": movie_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review reported",
        MovieRef { movie_id },
        Some(Meta::empty()),
    ))
}
