pub mod catalog;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod models;
pub mod query;
pub mod rescore;
pub mod state;
