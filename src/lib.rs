pub mod app;
pub mod auction;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod handlers;
pub mod message_broker;
pub mod model;
pub mod query;
pub mod rental;
pub mod scheduler;
pub mod settlement;
pub mod store;
pub mod user;
pub mod wishlist;
