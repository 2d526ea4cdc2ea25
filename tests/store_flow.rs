mod common;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use movie_store::{
    db::{create_pool, run_migrations},
    dto::{
        auth::{LoginRequest, SignupRequest},
        movies::UpdateMovieRequest,
        reviews::{ReviewForm, UnreportRequest},
    },
    entity::{movies::ActiveModel as MovieActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    models::{ROLE_ADMIN, ROLE_USER},
    routes::{
        create_router,
        params::{AdminReviewQuery, MovieQuery, Pagination},
    },
    services::{
        admin_service, auth_service, cart_service, movie_service, order_service, review_service,
    },
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use tower::ServiceExt;
use uuid::Uuid;

// Integration flow: cart -> checkout -> order history, review moderation and catalog search.
#[tokio::test]
async fn cart_checkout_and_review_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let alice = login_as(&state, "alice", ROLE_USER).await?;
    let bob = login_as(&state, "bob", ROLE_USER).await?;
    let admin = login_as(&state, "movieStoreAdmin", ROLE_ADMIN).await?;

    let matrix = create_movie(&state, "The Matrix", 1000).await?;
    let heat = create_movie(&state, "Heat", 500).await?;
    let reloaded = create_movie(&state, "The Matrix Reloaded", 900).await?;

    // Empty cart: checkout creates nothing.
    assert!(order_service::checkout(&state, &alice).await?.is_none());

    cart_service::add_to_cart(&state, &alice, matrix).await?;
    cart_service::add_to_cart(&state, &alice, heat).await?;
    let added = cart_service::add_to_cart(&state, &alice, matrix).await?;
    let added = added.data.expect("added");
    assert_eq!(added.quantity, 2);
    assert_eq!(added.item_count, 3);

    let view = cart_service::view_cart(&state, &alice).await?.data.expect("cart");
    assert_eq!(view.total_price, 2500);
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].movie.id, matrix);
    assert_eq!(view.items[1].movie.id, heat);

    // Bob's cart is separate.
    let count = cart_service::cart_count(&state, &bob).await?.data.expect("count");
    assert_eq!(count.item_count, 0);

    assert_matches!(
        cart_service::add_to_cart(&state, &alice, Uuid::new_v4()).await,
        Err(AppError::NotFound)
    );

    let placed = order_service::checkout(&state, &alice)
        .await?
        .expect("order for a non-empty cart");
    assert_eq!(placed.order.user_id, alice.user_id);
    assert_eq!(placed.order.total_price, 2500);
    assert_eq!(placed.items.len(), 2);
    let sum: i64 = placed.items.iter().map(|i| i.line_total()).sum();
    assert_eq!(sum, placed.order.total_price);

    let count = cart_service::cart_count(&state, &alice).await?.data.expect("count");
    assert_eq!(count.item_count, 0);
    assert!(order_service::checkout(&state, &alice).await?.is_none());

    // Item prices are a snapshot taken at checkout.
    movie_service::update_movie(
        &state,
        &admin,
        matrix,
        UpdateMovieRequest {
            title: None,
            description: None,
            price: Some(1500),
            image: None,
        },
    )
    .await?;
    let stored = order_service::get_order(&state, &alice, placed.order.id)
        .await?
        .data
        .expect("order");
    let matrix_line = stored
        .items
        .iter()
        .find(|i| i.movie_id == matrix)
        .expect("matrix line");
    assert_eq!(matrix_line.price, 1000);
    assert_eq!(matrix_line.quantity, 2);
    assert_eq!(stored.order.total_price, 2500);

    // Orders are private to their owner.
    assert_matches!(
        order_service::get_order(&state, &bob, placed.order.id).await,
        Err(AppError::NotFound)
    );
    let history = order_service::list_orders(&state, &alice, Pagination::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(history.items.len(), 1);
    let bobs = order_service::list_orders(&state, &bob, Pagination::default())
        .await?
        .data
        .expect("orders");
    assert!(bobs.items.is_empty());

    // A movie removed from the catalog breaks the cart view.
    cart_service::add_to_cart(&state, &bob, reloaded).await?;
    movie_service::delete_movie(&state, &admin, reloaded).await?;
    assert_matches!(
        cart_service::view_cart(&state, &bob).await,
        Err(AppError::NotFound)
    );
    // ...and checkout rolls back entirely: no order, cart untouched.
    assert_matches!(
        order_service::checkout(&state, &bob).await,
        Err(AppError::NotFound)
    );
    let bobs = order_service::list_orders(&state, &bob, Pagination::default())
        .await?
        .data
        .expect("orders");
    assert!(bobs.items.is_empty());
    let count = cart_service::cart_count(&state, &bob).await?.data.expect("count");
    assert_eq!(count.item_count, 1);

    cart_service::clear_cart(&state, &bob).await?;
    let view = cart_service::view_cart(&state, &bob).await?.data.expect("cart");
    assert!(view.items.is_empty());

    // Reviews: only the author edits or deletes, anyone reports.
    let review = review_service::create_review(
        &state,
        &alice,
        heat,
        ReviewForm {
            comment: "  Great heist movie.  ".into(),
        },
    )
    .await?
    .data
    .expect("review");
    assert_eq!(review.comment, "Great heist movie.");
    assert!(!review.is_reported);

    assert_matches!(
        review_service::create_review(&state, &alice, heat, ReviewForm { comment: " ".into() })
            .await,
        Err(AppError::Validation(_))
    );
    assert_matches!(
        review_service::update_review(
            &state,
            &bob,
            review.id,
            ReviewForm {
                comment: "hijacked".into()
            }
        )
        .await,
        Err(AppError::Forbidden)
    );
    assert_matches!(
        review_service::delete_review(&state, &bob, review.id).await,
        Err(AppError::Forbidden)
    );
    assert_matches!(
        review_service::update_review(&state, &bob, Uuid::new_v4(), ReviewForm { comment: "x".into() })
            .await,
        Err(AppError::NotFound)
    );

    let updated = review_service::update_review(
        &state,
        &alice,
        review.id,
        ReviewForm {
            comment: "Even better the second time.".into(),
        },
    )
    .await?
    .data
    .expect("review");
    assert_eq!(updated.comment, "Even better the second time.");

    let visible = movie_service::get_movie_detail(&state, heat)
        .await?
        .data
        .expect("detail");
    assert_eq!(visible.reviews.len(), 1);
    assert_eq!(visible.reviews[0].author.as_deref(), Some("alice"));

    let reported = review_service::report_review(&state, &bob, review.id)
        .await?
        .data
        .expect("movie ref");
    assert_eq!(reported.movie_id, heat);
    review_service::report_review(&state, &bob, review.id).await?;

    let hidden = movie_service::get_movie_detail(&state, heat)
        .await?
        .data
        .expect("detail");
    assert!(hidden.reviews.is_empty());

    let flagged = admin_service::list_reviews(
        &state,
        &admin,
        AdminReviewQuery {
            reported: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("reviews");
    assert_eq!(flagged.items.len(), 1);

    let restored = admin_service::unreport_reviews(
        &state,
        &admin,
        UnreportRequest {
            ids: vec![review.id],
        },
    )
    .await?
    .data
    .expect("result");
    assert_eq!(restored.updated, 1);
    let visible = movie_service::get_movie_detail(&state, heat)
        .await?
        .data
        .expect("detail");
    assert_eq!(visible.reviews.len(), 1);

    review_service::delete_review(&state, &alice, review.id).await?;
    assert_matches!(
        review_service::get_review_for_edit(&state, &alice, review.id).await,
        Err(AppError::NotFound)
    );

    // Search is a case-insensitive substring match on the title.
    let found = movie_service::list_movies(
        &state,
        MovieQuery {
            q: Some("MATRIX".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("movies");
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].id, matrix);

    let none = movie_service::list_movies(
        &state,
        MovieQuery {
            q: Some("%".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("movies");
    assert!(none.items.is_empty());

    // Admin-only operations stay admin-only.
    assert_matches!(
        movie_service::delete_movie(&state, &alice, heat).await,
        Err(AppError::Forbidden)
    );

    accounts_and_logout(&state, heat).await?;

    Ok(())
}

// Tokens go through the router so the extractor's session check is exercised.
async fn accounts_and_logout(state: &AppState, movie_id: Uuid) -> anyhow::Result<()> {
    let signup = |username: &str, email: Option<&str>| SignupRequest {
        username: username.to_string(),
        email: email.map(str::to_string),
        password1: "s3cret-pass".into(),
        password2: "s3cret-pass".into(),
    };

    let carol = auth_service::register_user(state, signup("carol", Some("")))
        .await?
        .data
        .expect("user");
    assert_eq!(carol.role, ROLE_USER);
    assert_eq!(carol.email, None);

    // Two sign-ups racing for one name: exactly one wins, the other is told why.
    let (first, second) = tokio::join!(
        auth_service::register_user(state, signup("dave", None)),
        auth_service::register_user(state, signup("dave", None)),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::BadRequest(_))))
    );

    assert_matches!(
        auth_service::login_user(
            state,
            LoginRequest {
                username: "carol".into(),
                password: "wrong-pass".into(),
            },
        )
        .await,
        Err(AppError::BadRequest(_))
    );
    let login = auth_service::login_user(
        state,
        LoginRequest {
            username: "carol".into(),
            password: "s3cret-pass".into(),
        },
    )
    .await?
    .data
    .expect("login");
    let bearer = login.token;

    let review = review_service::create_review(
        state,
        &AuthUser {
            user_id: carol.id,
            role: ROLE_USER.into(),
            session_id: Uuid::new_v4(),
        },
        movie_id,
        ReviewForm {
            comment: "Worth a rewatch.".into(),
        },
    )
    .await?
    .data
    .expect("review");
    let report_uri = format!("/review/{}/report/", review.id);

    assert_eq!(call(state, Method::POST, &report_uri, &bearer).await, StatusCode::OK);
    assert_eq!(call(state, Method::GET, "/cart/count/", &bearer).await, StatusCode::OK);
    assert_eq!(
        call(state, Method::GET, "/admin/orders", &bearer).await,
        StatusCode::FORBIDDEN
    );

    assert_eq!(call(state, Method::POST, "/logout/", &bearer).await, StatusCode::OK);

    // The token outlives its session but no longer authenticates anything.
    for (method, uri) in [
        (Method::POST, report_uri.as_str()),
        (Method::GET, "/cart/count/"),
        (Method::GET, "/orders/"),
        (Method::POST, "/logout/"),
    ] {
        assert_eq!(
            call(state, method, uri, &bearer).await,
            StatusCode::UNAUTHORIZED,
            "{uri}"
        );
    }

    Ok(())
}

async fn call(state: &AppState, method: Method, uri: &str, bearer: &str) -> StatusCode {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer)
        .body(Body::empty())
        .expect("request");
    create_router(state.clone())
        .oneshot(req)
        .await
        .expect("response")
        .status()
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let state = AppState::new(pool, common::test_config(database_url));
    run_migrations(&state.orm).await?;

    // Clean tables between runs
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE order_items, orders, reviews, sessions, audit_logs, movies, users RESTART IDENTITY CASCADE",
        ))
        .await?;

    Ok(state)
}

async fn login_as(state: &AppState, username: &str, role: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(None),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let session = state.sessions.create(&state.orm, user.id).await?;
    Ok(AuthUser {
        user_id: user.id,
        role: role.into(),
        session_id: session.id,
    })
}

async fn create_movie(state: &AppState, title: &str, price: i64) -> anyhow::Result<Uuid> {
    let movie = MovieActive {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        description: Set(String::new()),
        price: Set(price),
        image: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(movie.id)
}
