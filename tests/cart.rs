use std::collections::HashMap;

use assert_matches::assert_matches;
use chrono::Utc;
use movie_store::{cart::Cart, error::AppError, models::Movie, session::Session};
use uuid::Uuid;

fn movie(title: &str, price: i64) -> Movie {
    Movie {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        price,
        image: None,
        created_at: Utc::now(),
    }
}

fn catalog(movies: &[&Movie]) -> HashMap<Uuid, Movie> {
    movies.iter().map(|m| (m.id, (*m).clone())).collect()
}

#[test]
fn repeated_additions_accumulate_quantity() {
    let id = Uuid::new_v4();
    let mut cart = Cart::new();
    for n in 1..=7 {
        assert_eq!(cart.add(id), n);
    }
    assert_eq!(cart.quantity(id), 7);
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.item_count(), 7);
}

#[test]
fn clearing_always_leaves_an_empty_cart() {
    let mut cart = Cart::new();
    cart.clear();
    assert!(cart.is_empty());

    cart.add(Uuid::new_v4());
    cart.add(Uuid::new_v4());
    cart.clear();
    assert!(cart.is_empty());
    assert_eq!(cart.item_count(), 0);

    cart.clear();
    assert_eq!(cart, Cart::new());
}

#[test]
fn pricing_multiplies_and_sums_in_insertion_order() {
    let a = movie("Movie A", 1000);
    let b = movie("Movie B", 500);
    let mut cart = Cart::new();
    cart.add(a.id);
    cart.add(b.id);
    cart.add(a.id);

    let priced = cart.price(&catalog(&[&a, &b])).expect("priced cart");
    assert_eq!(priced.total_price, 2500);
    assert_eq!(priced.items.len(), 2);

    assert_eq!(priced.items[0].movie.id, a.id);
    assert_eq!(priced.items[0].quantity, 2);
    assert_eq!(priced.items[0].line_total, 2000);
    assert_eq!(priced.items[1].movie.id, b.id);
    assert_eq!(priced.items[1].quantity, 1);
    assert_eq!(priced.items[1].line_total, 500);
}

#[test]
fn pricing_fails_when_a_movie_is_gone() {
    let a = movie("Still here", 1000);
    let mut cart = Cart::new();
    cart.add(a.id);
    cart.add(Uuid::new_v4());

    assert_matches!(cart.price(&catalog(&[&a])), Err(AppError::NotFound));
}

#[test]
fn pricing_rejects_a_total_that_does_not_fit() {
    let pricey = movie("Priced wrong", i64::MAX);
    let mut cart = Cart::new();
    cart.add(pricey.id);
    cart.add(pricey.id);
    assert_matches!(cart.price(&catalog(&[&pricey])), Err(AppError::BadRequest(_)));

    let half = movie("Half", i64::MAX / 2 + 1);
    let other = movie("Other half", i64::MAX / 2 + 1);
    let mut cart = Cart::new();
    cart.add(half.id);
    cart.add(other.id);
    assert_matches!(
        cart.price(&catalog(&[&half, &other])),
        Err(AppError::BadRequest(_))
    );
}

#[test]
fn empty_cart_prices_to_zero() {
    let priced = Cart::new().price(&HashMap::new()).expect("priced cart");
    assert!(priced.items.is_empty());
    assert_eq!(priced.total_price, 0);
}

#[test]
fn cart_survives_a_session_round_trip_in_order() {
    let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    let mut cart = Cart::new();
    for id in ids.iter().rev() {
        cart.add(*id);
    }
    cart.add(ids[2]);

    let mut session = Session::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
    session.insert(Cart::SESSION_KEY, &cart).expect("insert");
    let bytes = session.encode().expect("encode");

    let restored = Session::decode(session.id, session.user_id, session.expiry_date, &bytes)
        .expect("decode");
    let restored_cart: Cart = restored
        .get(Cart::SESSION_KEY)
        .expect("get")
        .expect("cart present");

    assert_eq!(restored_cart, cart);
    let order: Vec<Uuid> = restored_cart.entries().map(|(id, _)| id).collect();
    let expected: Vec<Uuid> = ids.iter().rev().copied().collect();
    assert_eq!(order, expected);
    assert_eq!(restored_cart.quantity(ids[2]), 2);
}

#[test]
fn session_without_cart_reads_as_none() {
    let session = Session::decode(Uuid::new_v4(), Uuid::new_v4(), Utc::now(), &[]).expect("decode");
    let cart: Option<Cart> = session.get(Cart::SESSION_KEY).expect("get");
    assert!(cart.is_none());
}

#[test]
fn session_expiry_is_inclusive() {
    let now = Utc::now();
    let session = Session::new(Uuid::new_v4(), Uuid::new_v4(), now);
    assert!(session.is_expired_at(now));
    assert!(!session.is_expired_at(now - chrono::Duration::seconds(1)));
}
