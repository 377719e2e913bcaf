pub mod auth;
pub mod render;
