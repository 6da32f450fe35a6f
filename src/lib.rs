pub mod app;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
