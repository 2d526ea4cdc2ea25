use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLine,
    dto::{
        auth::{LoginRequest, LoginResponse, SignupForm, SignupRequest},
        cart::{CartAdded, CartCount, CartView},
        movies::{CreateMovieRequest, MovieDetail, MovieList, UpdateMovieRequest},
        orders::{OrderList, OrderWithItems},
        reviews::{MovieRef, ReviewForm, ReviewList, UnreportRequest, UnreportResult},
    },
    models::{Movie, Order, OrderItem, Review, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, home, movies, orders, params, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home::home,
        health::health_check,
        auth::signup_form,
        auth::signup,
        auth::login,
        auth::logout,
        movies::list_movies,
        movies::movie_detail,
        movies::submit_review,
        reviews::edit_review_form,
        reviews::edit_review,
        reviews::delete_review_confirm,
        reviews::delete_review,
        reviews::report_review,
        cart::view_cart,
        cart::cart_count,
        cart::add_to_cart,
        cart::clear_cart,
        cart::checkout,
        orders::list_orders,
        orders::get_order,
        admin::create_movie,
        admin::update_movie,
        admin::delete_movie,
        admin::list_reviews,
        admin::unreport_reviews,
        admin::list_all_orders,
        admin::get_order_admin
    ),
    components(
        schemas(
            User,
            Movie,
            Review,
            Order,
            OrderItem,
            CartLine,
            CartView,
            CartCount,
            CartAdded,
            SignupRequest,
            SignupForm,
            LoginRequest,
            LoginResponse,
            ReviewForm,
            MovieRef,
            UnreportRequest,
            UnreportResult,
            ReviewList,
            CreateMovieRequest,
            UpdateMovieRequest,
            MovieList,
            MovieDetail,
            OrderList,
            OrderWithItems,
            params::Pagination,
            params::MovieQuery,
            params::AdminOrderQuery,
            params::AdminReviewQuery,
            Meta,
            ApiResponse<Movie>,
            ApiResponse<MovieList>,
            ApiResponse<MovieDetail>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Home", description = "Landing page"),
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sign-up and session endpoints"),
        (name = "Movies", description = "Catalog and review submission"),
        (name = "Reviews", description = "Review editing and moderation"),
        (name = "Cart", description = "Session cart and checkout"),
        (name = "Orders", description = "Order history"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
