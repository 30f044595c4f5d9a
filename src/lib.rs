pub mod admin;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod html;
pub mod models;
pub mod security;
pub mod server;
pub mod urls;
pub mod views;
