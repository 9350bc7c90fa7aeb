pub mod models;
pub mod tweets;
pub mod users;
