pub mod contract;
pub mod location;
pub mod profile;
pub mod rental_post;
pub mod user;
