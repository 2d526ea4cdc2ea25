use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::CartLine;

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_price: i64,
    pub item_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartCount {
    pub item_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartAdded {
    pub movie_id: Uuid,
    pub quantity: u32,
    pub item_count: u64,
}
