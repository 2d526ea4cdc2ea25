pub mod auth;
pub mod cart;
pub mod movies;
pub mod orders;
pub mod reviews;
