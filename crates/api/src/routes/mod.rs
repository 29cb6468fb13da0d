pub mod admin;
pub mod auth;
pub mod benefits;
pub mod health;
pub mod models;
pub mod profile;
