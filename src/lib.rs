pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod services;
pub mod state;
