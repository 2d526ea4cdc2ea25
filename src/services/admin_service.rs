use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        orders::{OrderList, OrderWithItems},
        reviews::{ReviewList, UnreportRequest, UnreportResult},
    },
    entity::{
        orders::Column as OrderCol,
        reviews::{Column as ReviewCol, Entity as Reviews},
        users::Entity as Users,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::{AdminOrderQuery, AdminReviewQuery},
    services::order_service::{find_order_with_items, page_of_orders},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: AdminOrderQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let mut condition = Condition::all();
    if let Some(user_id) = query.user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }
    let (items, meta) = page_of_orders(&state.orm, condition, query.pagination()).await?;
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = find_order_with_items(&state.orm, Condition::all().add(OrderCol::Id.eq(id))).await?;
    Ok(ApiResponse::success("Order", order, Some(Meta::empty())))
}

pub async fn list_reviews(
    state: &AppState,
    user: &AuthUser,
    query: AdminReviewQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(reported) = query.reported {
        condition = condition.add(ReviewCol::IsReported.eq(reported));
    }

    let finder = Reviews::find()
        .filter(condition)
        .order_by_desc(ReviewCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, author)| Review::from_entity(review, author))
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Clear the reported flag on every listed review.
pub async fn unreport_reviews(
    state: &AppState,
    user: &AuthUser,
    payload: UnreportRequest,
) -> AppResult<ApiResponse<UnreportResult>> {
    ensure_admin(user)?;
    if payload.ids.is_empty() {
        return Ok(ApiResponse::success(
            "Nothing to update",
            UnreportResult { updated: 0 },
            Some(Meta::empty()),
        ));
    }

    let result = Reviews::update_many()
        .col_expr(ReviewCol::IsReported, Expr::value(false))
        .filter(ReviewCol::Id.is_in(payload.ids.iter().copied()))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_unreport",
        "reviews",
        serde_json::json!({ "review_ids": payload.ids, "updated": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::success(
        "Reviews restored",
        UnreportResult {
            updated: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}
