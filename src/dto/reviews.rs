use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Review;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReviewForm {
    #[validate(length(min = 1, message = "This field is required"))]
    pub comment: String,
}

impl ReviewForm {
    /// Surrounding whitespace is not part of a comment.
    pub fn normalized(self) -> Self {
        Self {
            comment: self.comment.trim().to_string(),
        }
    }
}

/// Points the client at the movie page a review action belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieRef {
    pub movie_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnreportRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreportResult {
    pub updated: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<Review>,
}
