pub mod admin;
pub mod auth;
pub mod contract;
pub mod location;
pub mod profile;
pub mod recommendation;
pub mod rental_post;
