pub mod auth;
pub mod messages;
pub mod middleware;
pub mod store;
pub mod submit;
