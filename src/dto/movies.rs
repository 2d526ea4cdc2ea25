use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Movie, Review};

/// Highest accepted unit price, in minor units.
pub const MAX_PRICE: i64 = 999_999;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    pub description: String,
    #[validate(range(min = 0, max = MAX_PRICE, message = "Price must be between 0 and 9999.99"))]
    pub price: i64,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMovieRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = MAX_PRICE, message = "Price must be between 0 and 9999.99"))]
    pub price: Option<i64>,
    pub image: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct MovieList {
    #[schema(value_type = Vec<Movie>)]
    pub items: Vec<Movie>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieDetail {
    pub movie: Movie,
    pub reviews: Vec<Review>,
}
