mod common;

use axum::extract::State;
use movie_store::routes::{health::health_check, home::home};

#[tokio::test]
async fn health_check_reports_unreachable_database() {
    let response = health_check(State(common::lazy_state())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "degraded");
    assert_eq!(data.database, "unavailable");
}

#[tokio::test]
async fn landing_page_links_the_catalog() {
    let response = home().await;
    let data = response.0.data.expect("landing data");
    assert!(data.links.iter().any(|l| l.href == "/movies/"));
}
