pub mod config;
pub mod db;
pub mod error_handler;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod seed;
pub mod store;
