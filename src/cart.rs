//! Session cart: an insertion-ordered mapping of movie id to quantity.
//!
//! The cart lives inside the caller's [`Session`](crate::session::Session)
//! under [`Cart::SESSION_KEY`]; it is never persisted on its own.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: IndexMap<Uuid, u32>,
}

/// One resolved cart entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub movie: Movie,
    pub quantity: u32,
    pub line_total: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PricedCart {
    pub items: Vec<CartLine>,
    pub total_price: i64,
}

impl Cart {
    pub const SESSION_KEY: &'static str = "cart";

    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `movie_id`, returning the new quantity.
    pub fn add(&mut self, movie_id: Uuid) -> u32 {
        let quantity = self.items.entry(movie_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    pub fn quantity(&self, movie_id: Uuid) -> u32 {
        self.items.get(&movie_id).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct movies.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn item_count(&self) -> u64 {
        self.items.values().map(|q| u64::from(*q)).sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Uuid, u32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn movie_ids(&self) -> Vec<Uuid> {
        self.items.keys().copied().collect()
    }

    /// Resolve every entry against `catalog`, in insertion order.
    ///
    /// A movie that no longer exists fails the whole cart with `NotFound`;
    /// a total that does not fit an `i64` is a `BadRequest`.
    pub fn price(&self, catalog: &HashMap<Uuid, Movie>) -> AppResult<PricedCart> {
        let mut items = Vec::with_capacity(self.items.len());
        let mut total_price: i64 = 0;
        for (movie_id, quantity) in self.entries() {
            let movie = catalog.get(&movie_id).ok_or(AppError::NotFound)?;
            let line_total = movie
                .price
                .checked_mul(i64::from(quantity))
                .ok_or_else(total_too_large)?;
            total_price = total_price
                .checked_add(line_total)
                .ok_or_else(total_too_large)?;
            items.push(CartLine {
                movie: movie.clone(),
                quantity,
                line_total,
            });
        }
        Ok(PricedCart { items, total_price })
    }
}

fn total_too_large() -> AppError {
    AppError::BadRequest("Cart total is too large".into())
}
