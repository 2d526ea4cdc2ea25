use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::Cart,
    dto::orders::{OrderList, OrderWithItems},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{cart_service::cart_of, movie_service::load_catalog},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    let (items, meta) = page_of_orders(&state.orm, condition, pagination).await?;
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

/// One page of orders matching `condition`, newest first, with their items.
pub(crate) async fn page_of_orders<C: ConnectionTrait>(
    db: &C,
    condition: Condition,
    pagination: Pagination,
) -> AppResult<(Vec<OrderWithItems>, Meta)> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(db).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?;

    let items = attach_items(db, orders).await?;
    Ok((items, Meta::new(page, limit, total)))
}

async fn attach_items<C: ConnectionTrait>(
    db: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderWithItems>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if !ids.is_empty() {
        let rows = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(ids))
            .order_by_asc(OrderItemCol::Id)
            .all(db)
            .await?;
        for row in rows {
            by_order.entry(row.order_id).or_default().push(row.into());
        }
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems {
                order: order.into(),
                items,
            }
        })
        .collect())
}

pub(crate) async fn find_order_with_items<C: ConnectionTrait>(
    db: &C,
    condition: Condition,
) -> AppResult<OrderWithItems> {
    let order = Orders::find()
        .filter(condition)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(db)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(OrderWithItems {
        order: order.into(),
        items,
    })
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let condition = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(OrderCol::Id.eq(id));
    let order = find_order_with_items(&state.orm, condition).await?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

/// Turn the caller's cart into an order.
///
/// Returns `Ok(None)` when the cart is empty. Otherwise the order, its items
/// and the emptied cart are written in one transaction; the session row stays
/// locked until commit so overlapping checkouts of one session serialize.
pub async fn checkout(state: &AppState, user: &AuthUser) -> AppResult<Option<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let mut session = state.sessions.load_for_update(&txn, user).await?;
    let mut cart = cart_of(&session)?;
    if cart.is_empty() {
        txn.rollback().await?;
        return Ok(None);
    }

    let catalog = load_catalog(&txn, &cart.movie_ids()).await?;
    let priced = cart.price(&catalog)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_price: Set(priced.total_price),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(priced.items.len());
    for line in &priced.items {
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| AppError::BadRequest("Cart quantity is too large".into()))?;
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            movie_id: Set(line.movie.id),
            quantity: Set(quantity),
            price: Set(line.movie.price),
        }
        .insert(&txn)
        .await?;
        order_items.push(item.into());
    }

    cart.clear();
    session.insert(Cart::SESSION_KEY, &cart)?;
    state.sessions.save(&txn, &session).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total_price = order.total_price,
        items = order_items.len(),
        "order placed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": order.total_price }),
    )
    .await;

    Ok(Some(OrderWithItems {
        order: Order::from(order),
        items: order_items,
    }))
}
