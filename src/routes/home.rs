use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

#[derive(Serialize, ToSchema)]
pub struct Landing {
    pub name: String,
    pub links: Vec<Link>,
}

#[derive(Serialize, ToSchema)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

fn link(rel: &str, href: &str) -> Link {
    Link {
        rel: rel.to_string(),
        href: href.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page", body = ApiResponse<Landing>),
    ),
    tag = "Home"
)]
pub async fn home() -> Json<ApiResponse<Landing>> {
    let data = Landing {
        name: "Movie Store".to_string(),
        links: vec![
            link("movies", "/movies/"),
            link("signup", "/signup/"),
            link("login", "/login/"),
            link("cart", "/cart/"),
            link("orders", "/orders/"),
        ],
    };
    Json(ApiResponse::success("Welcome", data, Some(Meta::empty())))
}
