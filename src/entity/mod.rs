pub mod movies;
pub mod order_items;
pub mod orders;
pub mod reviews;
pub mod sessions;
pub mod users;

pub use movies::Entity as Movies;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use reviews::Entity as Reviews;
pub use sessions::Entity as Sessions;
pub use users::Entity as Users;
